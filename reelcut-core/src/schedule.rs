//! Publish slot assignment under a fixed daily capacity.
//!
//! A clip's slot depends only on its 1-based index, the schedule and the
//! batch's base instant. The base instant is read once per batch by the
//! caller; nothing here looks at the wall clock, so the same inputs always
//! give the same timestamp.

use crate::config::ScheduleConfig;
use crate::error::{CoreError, CoreResult};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where a clip lands in the publishing calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Whole days after the base instant's date
    pub day_offset: u32,
    /// Position within the day, in `0..clips_per_day`
    pub slot_index: u32,
    /// Publish time, minute-granular, UTC
    pub scheduled_at: DateTime<Utc>,
}

/// Computes the publish slot for clip number `clip_index` (1-based).
///
/// `day_offset = (i - 1) / clips_per_day`, `slot_index = (i - 1) % clips_per_day`
/// and the timestamp is the base date plus `day_offset` days, at
/// `start_hour:00:00`, plus `slot_index * interval_minutes` minutes.
///
/// # Errors
///
/// `InvalidConfiguration` for `clip_index == 0`, `clips_per_day == 0` or a
/// start hour outside `0..=23`.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use reelcut_core::config::ScheduleConfig;
/// use reelcut_core::schedule::assign_slot;
///
/// let base = Utc.with_ymd_and_hms(2024, 3, 1, 17, 42, 5).unwrap();
/// let slot = assign_slot(11, &ScheduleConfig::default(), base).unwrap();
/// assert_eq!(slot.day_offset, 1);
/// assert_eq!(slot.scheduled_at, Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap());
/// ```
pub fn assign_slot(
    clip_index: usize,
    schedule: &ScheduleConfig,
    base_instant: DateTime<Utc>,
) -> CoreResult<ScheduleSlot> {
    if clip_index == 0 {
        return Err(CoreError::InvalidConfiguration(
            "clip index is 1-based; 0 has no slot".to_string(),
        ));
    }
    if schedule.clips_per_day == 0 {
        return Err(CoreError::InvalidConfiguration(
            "clips per day must be at least 1".to_string(),
        ));
    }

    let position = (clip_index - 1) as u64;
    let per_day = u64::from(schedule.clips_per_day);
    let day_offset = position / per_day;
    let slot_index = position % per_day;

    let day_start = base_instant
        .date_naive()
        .and_hms_opt(schedule.start_hour, 0, 0)
        .ok_or_else(|| {
            CoreError::InvalidConfiguration(format!(
                "start hour must be in 0..=23, got {}",
                schedule.start_hour
            ))
        })?
        .and_utc();

    let offset_minutes = slot_index * u64::from(schedule.interval_minutes);
    let scheduled_at = day_start
        + Duration::days(day_offset as i64)
        + Duration::minutes(offset_minutes as i64);

    Ok(ScheduleSlot {
        day_offset: day_offset as u32,
        slot_index: slot_index as u32,
        scheduled_at,
    })
}
