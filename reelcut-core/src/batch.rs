// ============================================================================
// reelcut-core/src/batch.rs
// ============================================================================
//
// BATCH ENTRY POINT: Source video in, per-clip report out
//
// `run_batch` is the only operation a caller needs:
//
//   1. validate the configuration
//   2. acquire the source (local file, or download into the scratch area)
//   3. check the watermark asset
//   4. detect scenes and partition them into clips
//   5. fix the base instant and run the clip pipeline
//
// Steps 1-4 are batch-fatal and return an error before any clip is
// processed. From step 5 on, failures are recorded per clip in the report.
// The scratch area lives for exactly the duration of the call.
//
// AI-ASSISTANT-INFO: Batch orchestration entry point

// ---- Internal crate imports ----
use crate::config::BatchConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::{BatchEvent, EventDispatcher};
use crate::external::{ClipExtractor, Publisher, SceneDetector, SourceDownloader, Watermarker};
use crate::pipeline::{CancellationToken, ClipPipelineRunner};
use crate::report::BatchReport;
use crate::retry::retry_with_backoff;
use crate::scratch::ScratchArea;
use crate::segmentation::partition;
use crate::utils::is_valid_video_file;

// ---- External crate imports ----
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where the source video comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoSource::File(path) => write!(f, "{}", path.display()),
            VideoSource::Url(url) => f.write_str(url),
        }
    }
}

/// Everything that describes one batch.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub source: VideoSource,
    /// Image overlaid on every clip, if any
    pub watermark: Option<PathBuf>,
    /// Clip `i` is described as `"{description_template} {i}"`
    pub description_template: String,
    pub config: BatchConfig,
    /// Anchor for the publish schedule; `Utc::now()` at batch start when `None`
    pub base_instant: Option<DateTime<Utc>>,
    pub cancellation: CancellationToken,
}

impl BatchRequest {
    pub fn new(source: VideoSource, description_template: impl Into<String>) -> Self {
        Self {
            source,
            watermark: None,
            description_template: description_template.into(),
            config: BatchConfig::default(),
            base_instant: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_watermark(mut self, asset: impl Into<PathBuf>) -> Self {
        self.watermark = Some(asset.into());
        self
    }

    pub fn with_config(mut self, config: BatchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_base_instant(mut self, instant: DateTime<Utc>) -> Self {
        self.base_instant = Some(instant);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }
}

/// The external collaborators a batch runs against.
pub struct Collaborators<'a> {
    pub detector: &'a dyn SceneDetector,
    pub extractor: &'a dyn ClipExtractor,
    pub watermarker: Option<&'a dyn Watermarker>,
    pub publisher: &'a dyn Publisher,
    pub downloader: Option<&'a dyn SourceDownloader>,
    pub events: Option<&'a EventDispatcher>,
}

impl<'a> Collaborators<'a> {
    pub fn new(
        detector: &'a dyn SceneDetector,
        extractor: &'a dyn ClipExtractor,
        publisher: &'a dyn Publisher,
    ) -> Self {
        Self {
            detector,
            extractor,
            watermarker: None,
            publisher,
            downloader: None,
            events: None,
        }
    }

    pub fn with_watermarker(mut self, watermarker: &'a dyn Watermarker) -> Self {
        self.watermarker = Some(watermarker);
        self
    }

    pub fn with_downloader(mut self, downloader: &'a dyn SourceDownloader) -> Self {
        self.downloader = Some(downloader);
        self
    }

    pub fn with_events(mut self, events: &'a EventDispatcher) -> Self {
        self.events = Some(events);
        self
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(dispatcher) = self.events {
            dispatcher.emit(event);
        }
    }
}

/// Runs one batch end to end.
///
/// # Errors
///
/// Only batch-fatal errors are returned: `InvalidConfiguration`,
/// `SourceAcquisitionFailed`, `SceneDetectionFailed`, and I/O errors creating
/// the scratch area. Per-clip failures are recorded in the report.
pub fn run_batch(request: &BatchRequest, collaborators: &Collaborators) -> CoreResult<BatchReport> {
    let result = run_batch_inner(request, collaborators);
    if let Err(e) = &result {
        collaborators.emit(BatchEvent::BatchFailed {
            message: e.to_string(),
        });
    }
    result
}

fn run_batch_inner(request: &BatchRequest, collaborators: &Collaborators) -> CoreResult<BatchReport> {
    let started = Instant::now();
    let config = &request.config;
    config.validate()?;

    let scratch = ScratchArea::create(config.scratch_dir.as_deref(), config.keep_scratch)?;
    info!("Starting batch {} for {}", scratch.batch_id(), request.source);

    let source = acquire_source(request, collaborators, &scratch)?;
    let watermark = resolve_watermark(request, collaborators)?;

    let scenes = collaborators
        .detector
        .detect_scenes(&source)
        .map_err(|e| match e {
            CoreError::SceneDetectionFailed(_) => e,
            other => CoreError::SceneDetectionFailed(other.to_string()),
        })?;
    let clips = partition(&scenes, config.max_clip_length_secs)?;
    info!(
        "{} scene(s) partitioned into {} clip(s) of at most {}s",
        scenes.len(),
        clips.len(),
        config.max_clip_length_secs
    );

    // Read once; every slot in the batch is computed from this instant
    let base_instant = request.base_instant.unwrap_or_else(Utc::now);
    debug!("Batch base instant: {}", base_instant);

    collaborators.emit(BatchEvent::BatchStarted {
        batch_id: scratch.batch_id().to_string(),
        source: request.source.to_string(),
        scene_count: scenes.len(),
        total_clips: clips.len(),
        base_instant,
    });

    let mut runner = ClipPipelineRunner::new(
        &source,
        &scratch,
        collaborators.extractor,
        collaborators.publisher,
        &config.schedule,
        base_instant,
    )
    .description_template(request.description_template.clone())
    .retry(config.retry.clone())
    .concurrency(config.concurrency)
    .cancellation(request.cancellation.clone());
    if let Some((watermarker, asset)) = watermark {
        runner = runner.watermark(watermarker, asset);
    }
    if let Some(events) = collaborators.events {
        runner = runner.events(events);
    }

    let report = runner.run(&clips)?;
    let summary = report.summary();
    info!(
        "Batch {} finished: {} published, {} failed, {} cancelled",
        report.batch_id,
        summary.published,
        summary.failed(),
        summary.cancelled
    );
    collaborators.emit(BatchEvent::BatchComplete {
        batch_id: report.batch_id.clone(),
        published: summary.published,
        failed: summary.failed(),
        cancelled: summary.cancelled,
        elapsed: started.elapsed(),
    });

    Ok(report)
}

fn acquire_source(
    request: &BatchRequest,
    collaborators: &Collaborators,
    scratch: &ScratchArea,
) -> CoreResult<PathBuf> {
    match &request.source {
        VideoSource::File(path) => {
            if path.is_file() {
                if !is_valid_video_file(path) {
                    warn!("{} does not have a known video extension", path.display());
                }
                Ok(path.clone())
            } else {
                Err(CoreError::SourceAcquisitionFailed(format!(
                    "{} does not exist or is not a file",
                    path.display()
                )))
            }
        }
        VideoSource::Url(url) => {
            let downloader = collaborators.downloader.ok_or_else(|| {
                CoreError::SourceAcquisitionFailed(format!("no downloader configured for {url}"))
            })?;
            let dest = scratch.source_dir()?;
            retry_with_backoff(&request.config.retry, "download source", |_| {
                downloader.download(url, &dest)
            })
            .map_err(|e| match e {
                CoreError::SourceAcquisitionFailed(_) => e,
                other => CoreError::SourceAcquisitionFailed(other.to_string()),
            })
        }
    }
}

fn resolve_watermark<'a>(
    request: &'a BatchRequest,
    collaborators: &Collaborators<'a>,
) -> CoreResult<Option<(&'a dyn Watermarker, &'a Path)>> {
    let Some(asset) = request.watermark.as_deref() else {
        if collaborators.watermarker.is_some() {
            warn!("A watermarker was supplied without a watermark asset; clips will not be watermarked");
        }
        return Ok(None);
    };
    if !asset.is_file() {
        return Err(CoreError::InvalidConfiguration(format!(
            "watermark asset {} does not exist",
            asset.display()
        )));
    }
    let watermarker = collaborators.watermarker.ok_or_else(|| {
        CoreError::InvalidConfiguration("watermark asset given but no watermarker configured".to_string())
    })?;
    Ok(Some((watermarker, asset)))
}
