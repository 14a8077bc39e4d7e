// ============================================================================
// reelcut-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Core error type and helper constructors
//
// Errors fall in two groups. Batch-fatal errors (configuration, source
// acquisition, scene detection) abort `run_batch` before any clip is
// processed. Per-clip errors (extraction, watermark, publish) are caught at
// the clip boundary by the pipeline runner and recorded in that clip's
// outcome.

use std::io;
use std::process::ExitStatus;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    // ---- Batch-fatal ----
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Source acquisition failed: {0}")]
    SourceAcquisitionFailed(String),

    #[error("Scene detection failed: {0}")]
    SceneDetectionFailed(String),

    // ---- Per-clip ----
    #[error("Clip extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Watermark failed: {0}")]
    WatermarkFailed(String),

    #[error("Publish failed: {0}")]
    PublishFailed(String),

    // ---- External processes ----
    #[error("Required dependency '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] io::Error),

    #[error("Failed waiting for {0}: {1}")]
    CommandWait(String, #[source] io::Error),

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{0} timed out after {1} seconds")]
    CommandTimeout(String, u64),

    // ---- Plumbing ----
    #[error("Path error: {0}")]
    PathError(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// True for errors that stop the whole batch rather than a single clip.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidConfiguration(_)
                | CoreError::SourceAcquisitionFailed(_)
                | CoreError::SceneDetectionFailed(_)
        )
    }
}

pub fn command_start_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandStart(command.into(), err)
}

pub fn command_wait_error(command: impl Into<String>, err: io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), err)
}

pub fn command_failed_error(
    command: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status,
        stderr: stderr.into(),
    }
}
