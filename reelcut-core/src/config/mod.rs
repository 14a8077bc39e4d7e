//! Configuration structures and constants for the reelcut-core library.
//!
//! `BatchConfig` carries everything that shapes a batch independent of the
//! particular source video: the clip length bound, the publishing schedule,
//! the retry policy and per-collaborator timeouts. Defaults are 60 second
//! clips, ten per day from 09:00 UTC at 30 minute spacing.

mod builder;
pub mod utils;

use crate::error::{CoreError, CoreResult};
use crate::retry::RetryPolicy;

use serde::{Deserialize, Serialize};

use std::path::PathBuf;
use std::time::Duration;

pub use builder::BatchConfigBuilder;

// Default constants

/// Default upper bound on a single clip, in seconds.
pub const DEFAULT_MAX_CLIP_LENGTH_SECS: f64 = 60.0;

/// Default number of clips published per calendar day.
pub const DEFAULT_CLIPS_PER_DAY: u32 = 10;

/// Default hour (UTC) of the first slot of each day.
pub const DEFAULT_START_HOUR: u32 = 9;

/// Default spacing between consecutive slots within a day.
pub const DEFAULT_INTERVAL_MINUTES: u32 = 30;

/// Default number of clips processed at once. 1 keeps processing strictly
/// sequential.
pub const DEFAULT_CONCURRENCY: usize = 1;

pub const DEFAULT_DETECT_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_EXTRACT_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_WATERMARK_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 1800;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Daily publishing capacity and spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Maximum clips scheduled on one calendar day (>= 1)
    pub clips_per_day: u32,

    /// Hour of day (UTC, 0-23) of slot 0
    pub start_hour: u32,

    /// Minutes between consecutive slots of the same day
    pub interval_minutes: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            clips_per_day: DEFAULT_CLIPS_PER_DAY,
            start_hour: DEFAULT_START_HOUR,
            interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

impl ScheduleConfig {
    /// Rejects schedules the scheduler cannot honour.
    ///
    /// Besides the basic ranges, the last slot of a day must still fall on
    /// that day. Otherwise it would collide with or overtake the next day's
    /// first slot.
    pub fn validate(&self) -> CoreResult<()> {
        if self.clips_per_day == 0 {
            return Err(CoreError::InvalidConfiguration(
                "clips per day must be at least 1".to_string(),
            ));
        }
        if self.start_hour > 23 {
            return Err(CoreError::InvalidConfiguration(format!(
                "start hour must be in 0..=23, got {}",
                self.start_hour
            )));
        }
        let last_slot_minute = u64::from(self.start_hour) * 60
            + u64::from(self.clips_per_day - 1) * u64::from(self.interval_minutes);
        if last_slot_minute >= u64::from(MINUTES_PER_DAY) {
            return Err(CoreError::InvalidConfiguration(format!(
                "{} clips every {} minutes from {:02}:00 runs past midnight",
                self.clips_per_day, self.interval_minutes, self.start_hour
            )));
        }
        Ok(())
    }
}

/// Per-call limits for the external collaborators, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    pub detect_secs: u64,
    pub extract_secs: u64,
    pub watermark_secs: u64,
    pub publish_secs: u64,
    pub download_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            detect_secs: DEFAULT_DETECT_TIMEOUT_SECS,
            extract_secs: DEFAULT_EXTRACT_TIMEOUT_SECS,
            watermark_secs: DEFAULT_WATERMARK_TIMEOUT_SECS,
            publish_secs: DEFAULT_PUBLISH_TIMEOUT_SECS,
            download_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl TimeoutConfig {
    pub fn detect(&self) -> Duration {
        Duration::from_secs(self.detect_secs)
    }

    pub fn extract(&self) -> Duration {
        Duration::from_secs(self.extract_secs)
    }

    pub fn watermark(&self) -> Duration {
        Duration::from_secs(self.watermark_secs)
    }

    pub fn publish(&self) -> Duration {
        Duration::from_secs(self.publish_secs)
    }

    pub fn download(&self) -> Duration {
        Duration::from_secs(self.download_secs)
    }

    fn validate(&self) -> CoreResult<()> {
        let all = [
            ("detect", self.detect_secs),
            ("extract", self.extract_secs),
            ("watermark", self.watermark_secs),
            ("publish", self.publish_secs),
            ("download", self.download_secs),
        ];
        for (name, secs) in all {
            if secs == 0 {
                return Err(CoreError::InvalidConfiguration(format!(
                    "{name} timeout must be greater than zero"
                )));
            }
        }
        Ok(())
    }
}

/// Main configuration structure for a batch.
///
/// The builder is the convenient way to override a few fields:
///
/// ```rust
/// use reelcut_core::config::BatchConfigBuilder;
///
/// let config = BatchConfigBuilder::new()
///     .max_clip_length_secs(45.0)
///     .clips_per_day(6)
///     .start_hour(12)
///     .interval_minutes(60)
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Upper bound on a clip's duration in seconds
    pub max_clip_length_secs: f64,

    /// Daily publishing schedule
    pub schedule: ScheduleConfig,

    /// Retry policy applied to every collaborator call
    pub retry: RetryPolicy,

    /// Per-call timeouts for the production collaborators
    pub timeouts: TimeoutConfig,

    /// Number of clips processed at once (1 = sequential)
    pub concurrency: usize,

    /// Parent directory for the per-batch scratch area (system temp dir when unset)
    pub scratch_dir: Option<PathBuf>,

    /// Leave the scratch area on disk after the batch instead of deleting it
    pub keep_scratch: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_clip_length_secs: DEFAULT_MAX_CLIP_LENGTH_SECS,
            schedule: ScheduleConfig::default(),
            retry: RetryPolicy::default(),
            timeouts: TimeoutConfig::default(),
            concurrency: DEFAULT_CONCURRENCY,
            scratch_dir: None,
            keep_scratch: false,
        }
    }
}

impl BatchConfig {
    /// Defaults with `REELCUT_*` environment overrides applied.
    ///
    /// Recognised variables: `REELCUT_MAX_CLIP_LENGTH`, `REELCUT_CLIPS_PER_DAY`,
    /// `REELCUT_START_HOUR`, `REELCUT_INTERVAL_MINUTES`,
    /// `REELCUT_RETRY_ATTEMPTS`, `REELCUT_CONCURRENCY`, `REELCUT_SCRATCH_DIR`,
    /// `REELCUT_KEEP_SCRATCH`.
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_clip_length_secs: utils::get_env_f64(
                "REELCUT_MAX_CLIP_LENGTH",
                defaults.max_clip_length_secs,
            ),
            schedule: ScheduleConfig {
                clips_per_day: utils::get_env_u32(
                    "REELCUT_CLIPS_PER_DAY",
                    defaults.schedule.clips_per_day,
                ),
                start_hour: utils::get_env_u32("REELCUT_START_HOUR", defaults.schedule.start_hour),
                interval_minutes: utils::get_env_u32(
                    "REELCUT_INTERVAL_MINUTES",
                    defaults.schedule.interval_minutes,
                ),
            },
            retry: RetryPolicy {
                attempts: utils::get_env_u32("REELCUT_RETRY_ATTEMPTS", defaults.retry.attempts),
                ..defaults.retry
            },
            concurrency: utils::get_env_usize("REELCUT_CONCURRENCY", defaults.concurrency),
            scratch_dir: utils::get_env_opt_path("REELCUT_SCRATCH_DIR"),
            keep_scratch: utils::get_env_bool("REELCUT_KEEP_SCRATCH", defaults.keep_scratch),
            ..defaults
        }
    }

    /// Validates every parameter. All failures are `InvalidConfiguration`.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.max_clip_length_secs.is_finite() || self.max_clip_length_secs <= 0.0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "max clip length must be a positive number of seconds, got {}",
                self.max_clip_length_secs
            )));
        }
        if self.concurrency == 0 {
            return Err(CoreError::InvalidConfiguration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        self.schedule.validate()?;
        self.retry.validate()?;
        self.timeouts.validate()?;
        Ok(())
    }
}
