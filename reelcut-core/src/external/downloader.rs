// ============================================================================
// reelcut-core/src/external/downloader.rs
// ============================================================================
//
// SOURCE DOWNLOAD: Remote video acquisition through yt-dlp
//
// yt-dlp names the file after the video title, so the downloaded path is
// not known up front. The download goes into a directory owned by the
// batch and the newest `.mp4` there is taken as the result.

use crate::error::{CoreError, CoreResult};
use crate::external::SourceDownloader;
use crate::external::process::run_command;

use log::{debug, info};

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

/// Downloads a video with the `yt-dlp` command-line tool.
#[derive(Debug, Clone)]
pub struct YtDlpDownloader {
    binary: String,
    format: String,
    timeout: Option<Duration>,
}

impl YtDlpDownloader {
    pub fn new(timeout: Duration) -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            format: "mp4".to_string(),
            timeout: Some(timeout),
        }
    }

    /// Uses a different executable, e.g. an absolute path or a wrapper script.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn build_command(&self, url: &str, dest_dir: &Path) -> Command {
        let template = dest_dir.join("%(title)s.%(ext)s");
        let mut cmd = Command::new(&self.binary);
        cmd.args(["--no-playlist", "-f", self.format.as_str(), "-o"])
            .arg(template)
            .arg(url);
        cmd
    }
}

impl SourceDownloader for YtDlpDownloader {
    fn download(&self, url: &str, dest_dir: &Path) -> CoreResult<PathBuf> {
        if url.trim().is_empty() {
            return Err(CoreError::SourceAcquisitionFailed("empty URL".to_string()));
        }
        fs::create_dir_all(dest_dir)?;
        info!("Downloading {} into {}", url, dest_dir.display());

        let mut cmd = self.build_command(url, dest_dir);
        run_command(&mut cmd, &self.binary, self.timeout)
            .and_then(|output| output.ensure_success(&self.binary))
            .map_err(|e| CoreError::SourceAcquisitionFailed(format!("{url}: {e}")))?;

        let path = newest_video(dest_dir)?.ok_or_else(|| {
            CoreError::SourceAcquisitionFailed(format!(
                "{} finished but no .mp4 appeared in {}",
                self.binary,
                dest_dir.display()
            ))
        })?;
        info!("Downloaded source to {}", path.display());
        Ok(path)
    }
}

/// Most recently modified `.mp4` directly inside `dir`.
pub fn newest_video(dir: &Path) -> CoreResult<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_mp4 = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mp4"));
        if !is_mp4 || !path.is_file() {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        debug!("Candidate download {}", path.display());
        if newest.as_ref().is_none_or(|(time, _)| modified >= *time) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}
