// reelcut-core/tests/common/mod.rs
//
// Hand-written collaborator doubles shared by the integration tests.
// Every double is Send + Sync so it can be driven by the parallel runner.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use reelcut_core::error::{CoreError, CoreResult};
use reelcut_core::external::{ClipExtractor, Publisher, SceneDetector, SourceDownloader, Watermarker};
use reelcut_core::retry::RetryPolicy;
use reelcut_core::segmentation::{ClipInterval, SceneBoundary};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Retry policy that retries without sleeping.
pub fn instant_retry(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        initial_backoff_ms: 0,
        max_backoff_ms: 0,
        backoff_multiplier: 1.0,
        jitter: false,
    }
}

pub fn create_dummy_file(dir: &Path, filename: &str) -> PathBuf {
    let path = dir.join(filename);
    fs::write(&path, b"dummy content").expect("Failed to create dummy file");
    path
}

/// Clip index encoded in an artifact name such as `scene_007_wm.mp4`.
pub fn clip_index_of(path: &Path) -> usize {
    let name = path.file_stem().unwrap().to_string_lossy();
    name.trim_start_matches("scene_")
        .split('_')
        .next()
        .unwrap()
        .parse()
        .unwrap()
}

/// Remaining forced failures per clip index; `u32::MAX` fails forever.
#[derive(Default)]
struct FailurePlan(Mutex<HashMap<usize, u32>>);

impl FailurePlan {
    fn with(indices: &[usize], times: u32) -> Self {
        Self(Mutex::new(indices.iter().map(|&i| (i, times)).collect()))
    }

    fn should_fail(&self, index: usize) -> bool {
        let mut plan = self.0.lock().unwrap();
        match plan.get_mut(&index) {
            Some(0) | None => false,
            Some(remaining) => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                true
            }
        }
    }
}

// ---- Scene detection ----

pub struct MockSceneDetector {
    scenes: Vec<SceneBoundary>,
    error: Option<String>,
    pub calls: Mutex<Vec<PathBuf>>,
}

impl MockSceneDetector {
    pub fn with_scenes(scenes: &[(f64, f64)]) -> Self {
        Self {
            scenes: scenes.iter().map(|&(s, e)| SceneBoundary::new(s, e)).collect(),
            error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            scenes: Vec::new(),
            error: Some(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl SceneDetector for MockSceneDetector {
    fn detect_scenes(&self, video: &Path) -> CoreResult<Vec<SceneBoundary>> {
        self.calls.lock().unwrap().push(video.to_path_buf());
        match &self.error {
            Some(message) => Err(CoreError::SceneDetectionFailed(message.clone())),
            None => Ok(self.scenes.clone()),
        }
    }
}

// ---- Extraction ----

#[derive(Default)]
pub struct MockExtractor {
    plan: FailurePlan,
    pub calls: Mutex<Vec<(usize, f64, f64)>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the given clips `times` times each before succeeding.
    pub fn failing(indices: &[usize], times: u32) -> Self {
        Self {
            plan: FailurePlan::with(indices, times),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts_for(&self, index: usize) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.0 == index).count()
    }
}

impl ClipExtractor for MockExtractor {
    fn extract_clip(&self, _source: &Path, clip: &ClipInterval, output: &Path) -> CoreResult<PathBuf> {
        self.calls.lock().unwrap().push((clip.index, clip.start, clip.end));
        if self.plan.should_fail(clip.index) {
            return Err(CoreError::ExtractionFailed(format!("cannot cut clip {}", clip.index)));
        }
        fs::write(output, format!("clip {}", clip.index))?;
        Ok(output.to_path_buf())
    }
}

// ---- Watermark ----

#[derive(Default)]
pub struct MockWatermarker {
    plan: FailurePlan,
    pub calls: Mutex<Vec<(PathBuf, PathBuf, PathBuf)>>,
}

impl MockWatermarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(indices: &[usize], times: u32) -> Self {
        Self {
            plan: FailurePlan::with(indices, times),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl Watermarker for MockWatermarker {
    fn apply_watermark(&self, clip: &Path, asset: &Path, output: &Path) -> CoreResult<PathBuf> {
        self.calls
            .lock()
            .unwrap()
            .push((clip.to_path_buf(), asset.to_path_buf(), output.to_path_buf()));
        assert_ne!(clip, output, "watermark output must differ from its input");
        if self.plan.should_fail(clip_index_of(clip)) {
            return Err(CoreError::WatermarkFailed("overlay filter failed".to_string()));
        }
        fs::copy(clip, output)?;
        Ok(output.to_path_buf())
    }
}

// ---- Publish ----

#[derive(Debug, Clone, PartialEq)]
pub struct PublishCall {
    pub video: PathBuf,
    pub description: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
pub struct MockPublisher {
    plan: FailurePlan,
    /// Clips whose upload takes longer, to shuffle completion order
    slow: HashSet<usize>,
    pub calls: Mutex<Vec<PublishCall>>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(indices: &[usize], times: u32) -> Self {
        Self {
            plan: FailurePlan::with(indices, times),
            ..Self::default()
        }
    }

    pub fn slow_for(indices: &[usize]) -> Self {
        Self {
            slow: indices.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Publisher for MockPublisher {
    fn publish(
        &self,
        video: &Path,
        description: &str,
        scheduled_at: Option<DateTime<Utc>>,
    ) -> CoreResult<String> {
        let index = clip_index_of(video);
        if self.slow.contains(&index) {
            thread::sleep(Duration::from_millis(50));
        }
        self.calls.lock().unwrap().push(PublishCall {
            video: video.to_path_buf(),
            description: description.to_string(),
            scheduled_at,
        });
        if self.plan.should_fail(index) {
            return Err(CoreError::PublishFailed("HTTP 500: upstream error".to_string()));
        }
        Ok(format!("{{\"id\":\"post-{index}\"}}"))
    }
}

// ---- Download ----

pub struct MockDownloader {
    plan: FailurePlan,
    pub calls: Mutex<Vec<(String, PathBuf)>>,
}

impl MockDownloader {
    pub fn new() -> Self {
        Self {
            plan: FailurePlan::default(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fails the first `times` downloads.
    pub fn failing(times: u32) -> Self {
        Self {
            plan: FailurePlan::with(&[0], times),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl SourceDownloader for MockDownloader {
    fn download(&self, url: &str, dest_dir: &Path) -> CoreResult<PathBuf> {
        self.calls.lock().unwrap().push((url.to_string(), dest_dir.to_path_buf()));
        if self.plan.should_fail(0) {
            return Err(CoreError::SourceAcquisitionFailed(format!("{url}: HTTP 404")));
        }
        Ok(create_dummy_file(dest_dir, "Downloaded Video.mp4"))
    }
}
