// ============================================================================
// reelcut-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: FFmpeg Process Abstraction
//
// Commands are assembled with ffmpeg-sidecar's `FfmpegCommand` and handed to
// an `FfmpegSpawner`. The production spawner runs them through the shared
// subprocess runner so every invocation is bounded by a timeout; tests swap
// in a spawner that records arguments and replays canned stderr.
//
// AI-ASSISTANT-INFO: FFmpeg process execution seam

use crate::error::CoreResult;
use crate::external::process::{CommandOutput, run_command};

use ffmpeg_sidecar::command::FfmpegCommand;
use std::time::Duration;

/// Something that can run a fully built ffmpeg command to completion.
pub trait FfmpegSpawner: Send + Sync {
    /// Runs the command, consuming it. A non-zero exit is returned in the
    /// output, not as an error; timeouts and spawn failures are errors.
    fn run(&self, cmd: FfmpegCommand, timeout: Option<Duration>) -> CoreResult<CommandOutput>;
}

/// Runs commands with the ffmpeg binary located by ffmpeg-sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    fn run(&self, mut cmd: FfmpegCommand, timeout: Option<Duration>) -> CoreResult<CommandOutput> {
        log::debug!("Running ffmpeg {}", command_args(&cmd).join(" "));
        run_command(cmd.as_inner_mut(), "ffmpeg", timeout)
    }
}

/// Returns the command's arguments as strings, for logging and tests.
pub fn command_args(cmd: &FfmpegCommand) -> Vec<String> {
    cmd.get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}
