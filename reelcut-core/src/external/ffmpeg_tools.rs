// ============================================================================
// reelcut-core/src/external/ffmpeg_tools.rs
// ============================================================================
//
// FFMPEG TOOLS: Clip trimming and watermark compositing
//
// Both tools build a single ffmpeg invocation, run it through an
// `FfmpegSpawner` with a timeout and check that the output file exists
// afterwards. Failures are reported as `ExtractionFailed` and
// `WatermarkFailed` respectively so the pipeline can attribute them to the
// right stage.
//
// AI-ASSISTANT-INFO: ffmpeg-backed ClipExtractor and Watermarker

use crate::error::{CoreError, CoreResult};
use crate::external::ffmpeg_executor::{FfmpegSpawner, SidecarSpawner};
use crate::external::{ClipExtractor, Watermarker};
use crate::segmentation::ClipInterval;

use ffmpeg_sidecar::command::FfmpegCommand;
use log::{debug, info};

use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// CLIP EXTRACTION
// ============================================================================

/// Cuts `[start, end)` out of the source with stream copy.
///
/// Stream copy snaps to keyframes, so the cut points are approximate.
pub struct FfmpegClipExtractor<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    timeout: Option<Duration>,
}

impl FfmpegClipExtractor<SidecarSpawner> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_spawner(SidecarSpawner, Some(timeout))
    }
}

impl<S: FfmpegSpawner> FfmpegClipExtractor<S> {
    pub fn with_spawner(spawner: S, timeout: Option<Duration>) -> Self {
        Self { spawner, timeout }
    }
}

impl<S: FfmpegSpawner> ClipExtractor for FfmpegClipExtractor<S> {
    fn extract_clip(&self, source: &Path, clip: &ClipInterval, output: &Path) -> CoreResult<PathBuf> {
        debug!(
            "Extracting clip {} ({:.3}s - {:.3}s) to {}",
            clip.index,
            clip.start,
            clip.end,
            output.display()
        );

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner()
            .overwrite()
            .input(source.to_string_lossy().into_owned())
            .arg("-ss")
            .arg(format!("{:.3}", clip.start))
            .arg("-to")
            .arg(format!("{:.3}", clip.end))
            .args(["-c", "copy"])
            .output(output.to_string_lossy().into_owned());

        run_to_file(&self.spawner, cmd, self.timeout, "ffmpeg extract", output)
            .map_err(|e| CoreError::ExtractionFailed(format!("clip {}: {e}", clip.index)))
    }
}

// ============================================================================
// WATERMARK
// ============================================================================

/// Default overlay position, in pixels from the top-left corner.
pub const DEFAULT_OVERLAY_OFFSET: (u32, u32) = (10, 10);

/// Composites an image over a clip with ffmpeg's `overlay` filter.
pub struct FfmpegWatermarker<S: FfmpegSpawner = SidecarSpawner> {
    spawner: S,
    timeout: Option<Duration>,
    offset: (u32, u32),
}

impl FfmpegWatermarker<SidecarSpawner> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_spawner(SidecarSpawner, Some(timeout))
    }
}

impl<S: FfmpegSpawner> FfmpegWatermarker<S> {
    pub fn with_spawner(spawner: S, timeout: Option<Duration>) -> Self {
        Self {
            spawner,
            timeout,
            offset: DEFAULT_OVERLAY_OFFSET,
        }
    }

    /// Moves the overlay to `x`, `y` pixels from the top-left corner.
    pub fn with_offset(mut self, x: u32, y: u32) -> Self {
        self.offset = (x, y);
        self
    }

    fn overlay_filter(&self) -> String {
        format!("overlay={}:{}", self.offset.0, self.offset.1)
    }
}

impl<S: FfmpegSpawner> Watermarker for FfmpegWatermarker<S> {
    fn apply_watermark(&self, clip: &Path, asset: &Path, output: &Path) -> CoreResult<PathBuf> {
        if clip == output {
            return Err(CoreError::WatermarkFailed(format!(
                "output {} would overwrite its own input",
                output.display()
            )));
        }
        debug!(
            "Watermarking {} with {} into {}",
            clip.display(),
            asset.display(),
            output.display()
        );

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner()
            .overwrite()
            .input(clip.to_string_lossy().into_owned())
            .input(asset.to_string_lossy().into_owned())
            .filter_complex(self.overlay_filter())
            .args(["-codec:a", "copy"])
            .output(output.to_string_lossy().into_owned());

        run_to_file(&self.spawner, cmd, self.timeout, "ffmpeg watermark", output)
            .map_err(|e| CoreError::WatermarkFailed(format!("{}: {e}", clip.display())))
    }
}

/// Runs `cmd` and checks that it left a file at `output`.
fn run_to_file<S: FfmpegSpawner>(
    spawner: &S,
    cmd: FfmpegCommand,
    timeout: Option<Duration>,
    label: &str,
    output: &Path,
) -> CoreResult<PathBuf> {
    spawner.run(cmd, timeout)?.ensure_success(label)?;
    if !output.is_file() {
        return Err(CoreError::PathError(format!(
            "{label} reported success but {} was not written",
            output.display()
        )));
    }
    info!("{} wrote {}", label, output.display());
    Ok(output.to_path_buf())
}
