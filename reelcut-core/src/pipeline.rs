// ============================================================================
// reelcut-core/src/pipeline.rs
// ============================================================================
//
// CLIP PIPELINE: Per-clip extract, watermark, schedule and publish
//
// Each clip moves through
//
//   Pending -> Extracted -> (Watermarked | WatermarkFailed)
//           -> Scheduled -> (Published | PublishFailed)
//
// with ExtractionFailed and Cancelled as the other terminal states. A
// failure ends that clip only; the runner always produces exactly one
// outcome per clip and the next clip starts regardless.
//
// Clips run one after another by default. With a concurrency above one they
// run on a dedicated rayon pool; outcomes are collected in clip order so the
// report is the same either way.
//
// AI-ASSISTANT-INFO: Per-clip state machine and batch execution

// ---- Internal crate imports ----
use crate::config::ScheduleConfig;
use crate::error::{CoreError, CoreResult};
use crate::events::{BatchEvent, EventDispatcher};
use crate::external::{ClipExtractor, Publisher, Watermarker};
use crate::report::BatchReport;
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::schedule::assign_slot;
use crate::scratch::{ArtifactStage, ScratchArea};
use crate::segmentation::ClipInterval;

// ---- External crate imports ----
use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// ---- Standard library imports ----
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ============================================================================
// OUTCOMES
// ============================================================================

/// Why a clip did not get published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClipErrorKind {
    ExtractionFailed,
    WatermarkFailed,
    PublishFailed,
    Cancelled,
}

impl fmt::Display for ClipErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClipErrorKind::ExtractionFailed => "ExtractionFailed",
            ClipErrorKind::WatermarkFailed => "WatermarkFailed",
            ClipErrorKind::PublishFailed => "PublishFailed",
            ClipErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipFailure {
    pub kind: ClipErrorKind,
    pub message: String,
}

/// Final record for one clip. Never modified after the runner returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipOutcome {
    pub clip_index: usize,
    pub interval: ClipInterval,
    pub scheduled_at: DateTime<Utc>,
    pub watermarked: bool,
    /// Response body from the platform, when published
    pub remote_result: Option<String>,
    pub error: Option<ClipFailure>,
}

impl ClipOutcome {
    fn pending(clip: &ClipInterval, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            clip_index: clip.index,
            interval: *clip,
            scheduled_at,
            watermarked: false,
            remote_result: None,
            error: None,
        }
    }

    fn failed(mut self, kind: ClipErrorKind, message: impl Into<String>) -> Self {
        self.error = Some(ClipFailure {
            kind,
            message: message.into(),
        });
        self
    }

    pub fn is_published(&self) -> bool {
        self.error.is_none() && self.remote_result.is_some()
    }

    pub fn error_kind(&self) -> Option<ClipErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Message for a stage failure, without the stage prefix the error's
/// Display would add.
fn failure_message(err: CoreError) -> String {
    match err {
        CoreError::ExtractionFailed(msg)
        | CoreError::WatermarkFailed(msg)
        | CoreError::PublishFailed(msg) => msg,
        other => other.to_string(),
    }
}

/// Clip indices key the report, the schedule and the scratch artifacts,
/// so each one must be a distinct 1-based value.
fn check_clip_indices(clips: &[ClipInterval]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(clips.len());
    for clip in clips {
        if clip.index == 0 {
            return Err(CoreError::InvalidConfiguration(
                "clip indices start at 1".to_string(),
            ));
        }
        if !seen.insert(clip.index) {
            return Err(CoreError::InvalidConfiguration(format!(
                "clip index {} appears more than once",
                clip.index
            )));
        }
    }
    Ok(())
}

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared flag that stops clips from starting once set.
///
/// Clips already in flight finish normally; clips not yet started are
/// recorded as `Cancelled`.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// RUNNER
// ============================================================================

/// Drives every clip of a batch through the pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use chrono::Utc;
/// use reelcut_core::config::ScheduleConfig;
/// use reelcut_core::external::{FfmpegClipExtractor, ReelsPublisher};
/// use reelcut_core::pipeline::ClipPipelineRunner;
/// use reelcut_core::scratch::ScratchArea;
/// use reelcut_core::segmentation::{partition, SceneBoundary};
/// use std::path::Path;
/// use std::time::Duration;
///
/// let clips = partition(&[SceneBoundary::new(0.0, 90.0)], 60.0)?;
/// let scratch = ScratchArea::create(None, false)?;
/// let extractor = FfmpegClipExtractor::new(Duration::from_secs(300));
/// let publisher = ReelsPublisher::new("page", "token", Duration::from_secs(300))?;
/// let schedule = ScheduleConfig::default();
///
/// let report = ClipPipelineRunner::new(
///     Path::new("input.mp4"),
///     &scratch,
///     &extractor,
///     &publisher,
///     &schedule,
///     Utc::now(),
/// )
/// .description_template("Highlights")
/// .run(&clips)?;
/// for line in report.render() {
///     println!("{line}");
/// }
/// # Ok::<(), reelcut_core::CoreError>(())
/// ```
pub struct ClipPipelineRunner<'a> {
    source: &'a Path,
    scratch: &'a ScratchArea,
    extractor: &'a dyn ClipExtractor,
    watermark: Option<(&'a dyn Watermarker, &'a Path)>,
    publisher: &'a dyn Publisher,
    schedule: &'a ScheduleConfig,
    base_instant: DateTime<Utc>,
    description_template: String,
    retry: RetryPolicy,
    concurrency: usize,
    cancellation: CancellationToken,
    events: Option<&'a EventDispatcher>,
}

impl<'a> ClipPipelineRunner<'a> {
    pub fn new(
        source: &'a Path,
        scratch: &'a ScratchArea,
        extractor: &'a dyn ClipExtractor,
        publisher: &'a dyn Publisher,
        schedule: &'a ScheduleConfig,
        base_instant: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            scratch,
            extractor,
            watermark: None,
            publisher,
            schedule,
            base_instant,
            description_template: String::new(),
            retry: RetryPolicy::default(),
            concurrency: 1,
            cancellation: CancellationToken::new(),
            events: None,
        }
    }

    /// Overlays `asset` on every clip before publishing.
    pub fn watermark(mut self, watermarker: &'a dyn Watermarker, asset: &'a Path) -> Self {
        self.watermark = Some((watermarker, asset));
        self
    }

    pub fn description_template(mut self, template: impl Into<String>) -> Self {
        self.description_template = template.into();
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers.max(1);
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn events(mut self, dispatcher: &'a EventDispatcher) -> Self {
        self.events = Some(dispatcher);
        self
    }

    /// Description sent with clip `clip_index`.
    pub fn describe(&self, clip_index: usize) -> String {
        format!("{} {}", self.description_template, clip_index)
    }

    /// Processes every clip and returns the report, ordered by clip index.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` when a clip index is zero or appears twice.
    /// Nothing is extracted or published in that case.
    pub fn run(&self, clips: &[ClipInterval]) -> CoreResult<BatchReport> {
        check_clip_indices(clips)?;
        let total = clips.len();
        info!(
            "Processing {} clip(s) with {} worker(s)",
            total, self.concurrency
        );

        let outcomes: Vec<ClipOutcome> = if self.concurrency > 1 && total > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.concurrency)
                .thread_name(|i| format!("reelcut-clip-{i}"))
                .build()
            {
                Ok(pool) => pool.install(|| {
                    clips
                        .par_iter()
                        .map(|clip| self.process_clip(clip, total))
                        .collect()
                }),
                Err(e) => {
                    warn!("Failed to build worker pool ({}), processing sequentially", e);
                    self.run_sequential(clips)
                }
            }
        } else {
            self.run_sequential(clips)
        };

        Ok(BatchReport::new(self.scratch.batch_id(), self.base_instant, outcomes))
    }

    fn run_sequential(&self, clips: &[ClipInterval]) -> Vec<ClipOutcome> {
        let total = clips.len();
        clips
            .iter()
            .map(|clip| self.process_clip(clip, total))
            .collect()
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(dispatcher) = self.events {
            dispatcher.emit(event);
        }
    }

    /// Runs one clip to a terminal state.
    fn process_clip(&self, clip: &ClipInterval, total: usize) -> ClipOutcome {
        let outcome = self.advance(clip, total);
        match &outcome.error {
            None => info!(
                "Clip {}/{} scheduled for {}",
                clip.index, total, outcome.scheduled_at
            ),
            Some(failure) if failure.kind == ClipErrorKind::Cancelled => {
                debug!("Clip {} cancelled", clip.index)
            }
            Some(failure) => error!(
                "Clip {}/{} failed ({}): {}",
                clip.index, total, failure.kind, failure.message
            ),
        }
        self.emit(BatchEvent::ClipFinished {
            total_clips: total,
            outcome: outcome.clone(),
        });
        outcome
    }

    fn advance(&self, clip: &ClipInterval, total: usize) -> ClipOutcome {
        let i = clip.index;

        // The slot only depends on the index, so even cancelled clips carry one
        let slot = match assign_slot(i, self.schedule, self.base_instant) {
            Ok(slot) => slot,
            Err(e) => {
                return ClipOutcome::pending(clip, self.base_instant)
                    .failed(ClipErrorKind::PublishFailed, format!("no schedule slot: {e}"));
            }
        };
        let outcome = ClipOutcome::pending(clip, slot.scheduled_at);

        if self.cancellation.is_cancelled() {
            return outcome.failed(
                ClipErrorKind::Cancelled,
                "batch cancelled before clip started",
            );
        }
        self.emit(BatchEvent::ClipStarted {
            clip_index: i,
            total_clips: total,
        });

        // ---- Extract ----
        let extracted_path = self.scratch.artifact_path(i, ArtifactStage::Extracted);
        let extracted = match retry_with_backoff(&self.retry, &format!("extract clip {i}"), |_| {
            self.extractor
                .extract_clip(self.source, clip, &extracted_path)
        }) {
            Ok(path) => path,
            Err(e) => return outcome.failed(ClipErrorKind::ExtractionFailed, failure_message(e)),
        };

        // ---- Watermark ----
        let (upload_path, watermarked): (PathBuf, bool) = match self.watermark {
            Some((watermarker, asset)) => {
                let output = self.scratch.artifact_path(i, ArtifactStage::Watermarked);
                match retry_with_backoff(&self.retry, &format!("watermark clip {i}"), |_| {
                    watermarker.apply_watermark(&extracted, asset, &output)
                }) {
                    Ok(path) => (path, true),
                    Err(e) => {
                        return outcome.failed(ClipErrorKind::WatermarkFailed, failure_message(e));
                    }
                }
            }
            None => (extracted, false),
        };
        let outcome = ClipOutcome {
            watermarked,
            ..outcome
        };

        // ---- Publish ----
        let description = self.describe(i);
        match retry_with_backoff(&self.retry, &format!("publish clip {i}"), |_| {
            self.publisher
                .publish(&upload_path, &description, Some(slot.scheduled_at))
        }) {
            Ok(body) => ClipOutcome {
                remote_result: Some(body),
                ..outcome
            },
            Err(e) => outcome.failed(ClipErrorKind::PublishFailed, failure_message(e)),
        }
    }
}
