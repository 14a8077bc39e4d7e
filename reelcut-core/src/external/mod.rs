// ============================================================================
// reelcut-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL COLLABORATORS: Media tools, downloader and publish API
//
// The engine never touches media or the network directly. Everything it
// needs from the outside world goes through the traits below, so the batch
// runner can be driven by the production implementations in this module or
// by test doubles.
//
// KEY COMPONENTS:
// - Collaborator traits (SceneDetector, ClipExtractor, Watermarker,
//   Publisher, SourceDownloader)
// - ffmpeg-backed implementations built on ffmpeg-sidecar
// - ReelsPublisher (reqwest multipart upload)
// - YtDlpDownloader (yt-dlp subprocess)
// - Dependency checking
//
// All traits require `Send + Sync` so one instance can serve every worker
// when clips are processed in parallel.
//
// AI-ASSISTANT-INFO: Collaborator traits and their production implementations

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};
use crate::segmentation::{ClipInterval, SceneBoundary};

// ---- External crate imports ----
use chrono::{DateTime, Utc};

// ---- Standard library imports ----
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

pub mod downloader;
pub mod ffmpeg_executor;
pub mod ffmpeg_tools;
pub mod process;
pub mod publisher;
pub mod scene_detector;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use downloader::YtDlpDownloader;
pub use ffmpeg_executor::{FfmpegSpawner, SidecarSpawner};
pub use ffmpeg_tools::{FfmpegClipExtractor, FfmpegWatermarker};
pub use process::{CommandOutput, run_command};
pub use publisher::ReelsPublisher;
pub use scene_detector::{DEFAULT_SCENE_THRESHOLD, FfmpegSceneDetector};

// ============================================================================
// COLLABORATOR TRAITS
// ============================================================================

/// Finds scene boundaries in a video.
pub trait SceneDetector: Send + Sync {
    /// Returns ordered, non-overlapping scenes. A video without cuts is one scene.
    fn detect_scenes(&self, video: &Path) -> CoreResult<Vec<SceneBoundary>>;
}

/// Cuts a clip interval out of the source video.
pub trait ClipExtractor: Send + Sync {
    /// Writes the clip to `output` and returns the written path.
    fn extract_clip(&self, source: &Path, clip: &ClipInterval, output: &Path) -> CoreResult<PathBuf>;
}

/// Overlays a watermark asset on a clip.
pub trait Watermarker: Send + Sync {
    /// Writes the watermarked clip to `output`, which must differ from `clip`.
    fn apply_watermark(&self, clip: &Path, asset: &Path, output: &Path) -> CoreResult<PathBuf>;
}

/// Uploads a clip to the remote platform.
pub trait Publisher: Send + Sync {
    /// Publishes `video`, scheduled for `scheduled_at` when that lies in the
    /// future. Returns the platform's response body.
    fn publish(
        &self,
        video: &Path,
        description: &str,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> CoreResult<String>;
}

/// Fetches a remote video into a local directory.
pub trait SourceDownloader: Send + Sync {
    fn download(&self, url: &str, dest_dir: &Path) -> CoreResult<PathBuf>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that an external command can be started.
///
/// Runs `<cmd_name> <version_arg>` with output discarded. Only a failure to
/// start counts; the exit status is ignored because tools disagree on what
/// their version flag returns.
///
/// # Errors
///
/// * `DependencyNotFound` - the command is not on `PATH`
/// * `CommandStart` - the command exists but could not be started
///
/// # Examples
///
/// ```rust,no_run
/// use reelcut_core::external::check_dependency;
///
/// for tool in ["ffmpeg", "ffprobe"] {
///     check_dependency(tool, "-version").unwrap();
/// }
/// check_dependency("yt-dlp", "--version").unwrap();
/// ```
pub fn check_dependency(cmd_name: &str, version_arg: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg(version_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
