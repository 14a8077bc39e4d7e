// ============================================================================
// reelcut-core/src/external/scene_detector.rs
// ============================================================================
//
// SCENE DETECTION: Content-change cuts via ffmpeg's scene score
//
// Runs `select='gt(scene,T)',showinfo` over the source and collects the
// `pts_time` of every frame whose scene score exceeds the threshold. Those
// cut points, together with the source duration, become contiguous scene
// boundaries covering the whole video.
//
// The duration comes from the input banner ffmpeg prints on the same run;
// ffprobe is only consulted when that line is missing.

use crate::error::{CoreError, CoreResult};
use crate::external::SceneDetector;
use crate::external::ffmpeg_executor::{FfmpegSpawner, SidecarSpawner};
use crate::segmentation::{MIN_CLIP_DURATION_SECS, SceneBoundary};
use crate::utils::parse_ffmpeg_time;

use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, info};

use std::path::Path;
use std::time::Duration;

/// Default scene-change threshold, in ffmpeg scene-score units.
pub const DEFAULT_SCENE_THRESHOLD: f64 = 0.3;

/// Scene detector backed by ffmpeg's `select` scene score.
pub struct FfmpegSceneDetector<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    threshold: f64,
    timeout: Option<Duration>,
}

impl FfmpegSceneDetector<SidecarSpawner> {
    pub fn new(threshold: f64, timeout: Duration) -> CoreResult<Self> {
        Self::with_spawner(SidecarSpawner, threshold, Some(timeout))
    }
}

impl<S: FfmpegSpawner> FfmpegSceneDetector<S> {
    pub fn with_spawner(spawner: S, threshold: f64, timeout: Option<Duration>) -> CoreResult<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CoreError::InvalidConfiguration(format!(
                "scene threshold must be within 0.0..=1.0, got {threshold}"
            )));
        }
        Ok(Self {
            spawner,
            threshold,
            timeout,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn build_command(&self, video: &Path) -> FfmpegCommand {
        let filter = format!("select='gt(scene,{})',showinfo", self.threshold);
        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner()
            .input(video.to_string_lossy().into_owned())
            .args(["-an", "-sn", "-filter:v"])
            .arg(filter)
            .format("null")
            .output("-");
        cmd
    }
}

impl<S: FfmpegSpawner> SceneDetector for FfmpegSceneDetector<S> {
    fn detect_scenes(&self, video: &Path) -> CoreResult<Vec<SceneBoundary>> {
        info!(
            "Detecting scenes in {} (threshold {})",
            video.display(),
            self.threshold
        );

        let output = self
            .spawner
            .run(self.build_command(video), self.timeout)
            .and_then(|output| output.ensure_success("ffmpeg scene detection"))
            .map_err(|e| CoreError::SceneDetectionFailed(e.to_string()))?;

        let cuts = parse_scene_cuts(&output.stderr_lines);
        let duration = match parse_input_duration(&output.stderr_lines) {
            Some(duration) => duration,
            None => ffprobe_duration(video)?,
        };
        debug!("Found {} cut(s) in {:.2}s of video", cuts.len(), duration);

        let scenes = scenes_from_cuts(&cuts, duration)?;
        info!("Detected {} scene(s)", scenes.len());
        Ok(scenes)
    }
}

/// Extracts `pts_time` values from showinfo lines, in ascending order.
pub fn parse_scene_cuts<S: AsRef<str>>(lines: &[S]) -> Vec<f64> {
    let mut cuts: Vec<f64> = lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| line.contains("showinfo"))
        .filter_map(|line| {
            let value = line.split("pts_time:").nth(1)?;
            value.split_whitespace().next()?.parse::<f64>().ok()
        })
        .filter(|t| t.is_finite())
        .collect();
    cuts.sort_by(f64::total_cmp);
    cuts.dedup();
    cuts
}

/// Reads the `Duration: HH:MM:SS.ss` line of ffmpeg's input banner.
pub fn parse_input_duration<S: AsRef<str>>(lines: &[S]) -> Option<f64> {
    lines.iter().map(AsRef::as_ref).find_map(|line| {
        let rest = line.trim_start().strip_prefix("Duration:")?;
        let value = rest.split(',').next()?.trim();
        parse_ffmpeg_time(value)
    })
}

fn ffprobe_duration(video: &Path) -> CoreResult<f64> {
    debug!("Falling back to ffprobe for the duration of {}", video.display());
    let info = ffprobe::ffprobe(video).map_err(|e| {
        CoreError::SceneDetectionFailed(format!("ffprobe failed for {}: {e}", video.display()))
    })?;
    info
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| {
            CoreError::SceneDetectionFailed(format!(
                "could not determine duration of {}",
                video.display()
            ))
        })
}

/// Turns sorted cut points into contiguous scenes spanning `0..duration`.
///
/// Cuts outside the video or too close to a neighbour are ignored. No cuts
/// at all gives a single scene covering the whole video.
pub fn scenes_from_cuts(cuts: &[f64], duration: f64) -> CoreResult<Vec<SceneBoundary>> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(CoreError::SceneDetectionFailed(format!(
            "source has no usable duration ({duration})"
        )));
    }

    let mut scenes = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0.0;
    for &cut in cuts {
        if cut - start < MIN_CLIP_DURATION_SECS || duration - cut < MIN_CLIP_DURATION_SECS {
            continue;
        }
        scenes.push(SceneBoundary::new(start, cut));
        start = cut;
    }
    scenes.push(SceneBoundary::new(start, duration));
    Ok(scenes)
}
