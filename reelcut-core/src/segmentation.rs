// ============================================================================
// reelcut-core/src/segmentation.rs
// ============================================================================
//
// CLIP PARTITIONING: Scene boundaries to bounded-length clips
//
// Scenes no longer than the maximum clip length become one clip each.
// Longer scenes are cut into consecutive `max_length` parts starting at the
// scene start; only the last part of a scene can be shorter. Parts cover the
// scene exactly once, with no gaps and no overlaps.
//
// Degenerate input (zero-length or inverted scenes, non-finite times) is
// skipped with a warning rather than failing the batch: the scene list comes
// from an external detector and a single bad entry should not cost the
// remaining clips.

use crate::error::{CoreError, CoreResult};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Intervals shorter than this (in seconds) carry no publishable content.
/// Also absorbs floating-point residue at exact multiples of the max length.
pub const MIN_CLIP_DURATION_SECS: f64 = 1e-3;

/// A detected interval of visual continuity, in seconds from the start of
/// the source video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBoundary {
    pub start: f64,
    pub end: f64,
}

impl SceneBoundary {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A bounded-duration sub-interval of the source video, destined to be
/// published on its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipInterval {
    /// 1-based position in the batch; drives naming and scheduling
    pub index: usize,
    pub start: f64,
    pub end: f64,
    /// 0-based index of the scene this clip was cut from
    pub source_scene_index: usize,
}

impl ClipInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Splits `scenes` into clips of at most `max_length` seconds.
///
/// Clips are numbered from 1 in scene order.
///
/// # Errors
///
/// `InvalidConfiguration` when `max_length` is not a positive finite number.
///
/// # Examples
///
/// ```rust
/// use reelcut_core::segmentation::{partition, SceneBoundary};
///
/// let scenes = [SceneBoundary::new(0.0, 90.0)];
/// let clips = partition(&scenes, 60.0).unwrap();
/// assert_eq!(clips.len(), 2);
/// assert_eq!((clips[1].start, clips[1].end), (60.0, 90.0));
/// ```
pub fn partition(scenes: &[SceneBoundary], max_length: f64) -> CoreResult<Vec<ClipInterval>> {
    if !max_length.is_finite() || max_length <= 0.0 {
        return Err(CoreError::InvalidConfiguration(format!(
            "max clip length must be a positive number of seconds, got {max_length}"
        )));
    }

    let mut clips = Vec::with_capacity(scenes.len());

    for (scene_index, scene) in scenes.iter().enumerate() {
        let (start, end) = (scene.start, scene.end);
        if !start.is_finite() || !end.is_finite() {
            warn!("Skipping scene {scene_index} with non-finite bounds ({start}, {end})");
            continue;
        }

        let duration = end - start;
        if duration < MIN_CLIP_DURATION_SECS {
            warn!(
                "Skipping scene {} with no usable duration ({:.3}s .. {:.3}s)",
                scene_index, start, end
            );
            continue;
        }

        if duration <= max_length {
            clips.push(ClipInterval {
                index: clips.len() + 1,
                start,
                end,
                source_scene_index: scene_index,
            });
            continue;
        }

        let num_parts = (duration / max_length).floor() as usize + 1;
        debug!(
            "Scene {} ({:.2}s) exceeds {:.2}s, splitting into up to {} parts",
            scene_index, duration, max_length, num_parts
        );
        for part in 0..num_parts {
            let part_start = start + part as f64 * max_length;
            let part_end = end.min(part_start + max_length);
            // Exact multiples leave an empty trailing part
            if part_end - part_start < MIN_CLIP_DURATION_SECS {
                continue;
            }
            clips.push(ClipInterval {
                index: clips.len() + 1,
                start: part_start,
                end: part_end,
                source_scene_index: scene_index,
            });
        }
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(clips: &[ClipInterval]) -> Vec<(f64, f64)> {
        clips.iter().map(|c| (c.start, c.end)).collect()
    }

    #[test]
    fn short_scene_becomes_single_clip() {
        let clips = partition(&[SceneBoundary::new(5.0, 35.0)], 60.0).unwrap();
        assert_eq!(spans(&clips), vec![(5.0, 35.0)]);
        assert_eq!(clips[0].index, 1);
        assert_eq!(clips[0].source_scene_index, 0);
    }

    #[test]
    fn scene_equal_to_max_length_is_not_split() {
        let clips = partition(&[SceneBoundary::new(0.0, 60.0)], 60.0).unwrap();
        assert_eq!(spans(&clips), vec![(0.0, 60.0)]);
    }

    #[test]
    fn mixed_scenes_yield_seven_clips() {
        let scenes = [
            SceneBoundary::new(0.0, 30.0),
            SceneBoundary::new(30.0, 120.0),
            SceneBoundary::new(120.0, 320.0),
        ];
        let clips = partition(&scenes, 60.0).unwrap();

        assert_eq!(clips.len(), 7);
        assert_eq!(
            spans(&clips),
            vec![
                (0.0, 30.0),
                (30.0, 90.0),
                (90.0, 120.0),
                (120.0, 180.0),
                (180.0, 240.0),
                (240.0, 300.0),
                (300.0, 320.0),
            ]
        );
        let indices: Vec<usize> = clips.iter().map(|c| c.index).collect();
        assert_eq!(indices, (1..=7).collect::<Vec<_>>());
        let owners: Vec<usize> = clips.iter().map(|c| c.source_scene_index).collect();
        assert_eq!(owners, vec![0, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn exact_multiple_has_no_remainder_clip() {
        let clips = partition(&[SceneBoundary::new(10.0, 130.0)], 60.0).unwrap();
        assert_eq!(spans(&clips), vec![(10.0, 70.0), (70.0, 130.0)]);
    }

    #[test]
    fn split_clips_are_bounded_and_cover_scene() {
        let scene = SceneBoundary::new(3.25, 250.75);
        let max = 17.5;
        let clips = partition(&[scene], max).unwrap();

        let expected = (scene.duration() / max).ceil() as usize;
        assert_eq!(clips.len(), expected);
        assert_eq!(clips.first().unwrap().start, scene.start);
        assert_eq!(clips.last().unwrap().end, scene.end);
        for pair in clips.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for clip in &clips {
            assert!(clip.duration() > 0.0);
            assert!(clip.duration() <= max + 1e-9);
        }
        let remainder = scene.duration() - max * (scene.duration() / max).floor();
        assert!((clips.last().unwrap().duration() - remainder).abs() < 1e-9);
    }

    #[test]
    fn degenerate_scenes_are_skipped() {
        let scenes = [
            SceneBoundary::new(0.0, 0.0),
            SceneBoundary::new(10.0, 5.0),
            SceneBoundary::new(f64::NAN, 4.0),
            SceneBoundary::new(20.0, 25.0),
        ];
        let clips = partition(&scenes, 60.0).unwrap();
        assert_eq!(spans(&clips), vec![(20.0, 25.0)]);
        assert_eq!(clips[0].index, 1);
        assert_eq!(clips[0].source_scene_index, 3);
    }

    #[test]
    fn rejects_non_positive_max_length() {
        let scenes = [SceneBoundary::new(0.0, 10.0)];
        for bad in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                partition(&scenes, bad),
                Err(CoreError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(partition(&[], 60.0).unwrap().is_empty());
    }
}
