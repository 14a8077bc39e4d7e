//! Per-batch scratch storage.
//!
//! Every batch gets its own directory holding the downloaded source (when
//! the source is remote) and the per-clip intermediate files. Artifact names
//! are derived from `(clip index, stage)` so concurrent clips never collide,
//! and the directory lives in a `tempfile::TempDir` so it is removed when the
//! `ScratchArea` is dropped, on success and failure paths alike.

use crate::error::CoreResult;

use log::{debug, info};
use tempfile::{Builder as TempFileBuilder, TempDir};

use std::path::{Path, PathBuf};

/// Pipeline stage an intermediate file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStage {
    Extracted,
    Watermarked,
}

impl ArtifactStage {
    fn suffix(self) -> &'static str {
        match self {
            ArtifactStage::Extracted => "",
            ArtifactStage::Watermarked => "_wm",
        }
    }
}

/// Scoped scratch directory for one batch.
#[derive(Debug)]
pub struct ScratchArea {
    dir: Option<TempDir>,
    path: PathBuf,
    batch_id: String,
    keep: bool,
}

impl ScratchArea {
    /// Creates a fresh scratch directory under `parent` (system temp dir when `None`).
    pub fn create(parent: Option<&Path>, keep: bool) -> CoreResult<Self> {
        let dir = match parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                TempFileBuilder::new().prefix("reelcut_").tempdir_in(parent)?
            }
            None => TempFileBuilder::new().prefix("reelcut_").tempdir()?,
        };
        let path = dir.path().to_path_buf();
        let batch_id = path
            .file_name()
            .map(|name| name.to_string_lossy().trim_start_matches("reelcut_").to_string())
            .unwrap_or_default();
        debug!("Created scratch area {} for batch {}", path.display(), batch_id);

        Ok(Self {
            dir: Some(dir),
            path,
            batch_id,
            keep,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier unique to this batch, taken from the directory name.
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Directory the source downloader writes into.
    pub fn source_dir(&self) -> CoreResult<PathBuf> {
        let dir = self.path.join("source");
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Path of the intermediate file for `clip_index` at `stage`.
    ///
    /// ```rust
    /// use reelcut_core::scratch::{ArtifactStage, ScratchArea};
    ///
    /// let scratch = ScratchArea::create(None, false).unwrap();
    /// let path = scratch.artifact_path(7, ArtifactStage::Watermarked);
    /// assert!(path.ends_with("scene_007_wm.mp4"));
    /// ```
    pub fn artifact_path(&self, clip_index: usize, stage: ArtifactStage) -> PathBuf {
        self.path
            .join(format!("scene_{clip_index:03}{}.mp4", stage.suffix()))
    }
}

impl Drop for ScratchArea {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if self.keep {
                let kept = dir.into_path();
                info!("Keeping scratch area at {}", kept.display());
            }
            // Otherwise TempDir's own Drop removes the directory
        }
    }
}
