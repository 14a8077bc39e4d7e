//! Core library for turning one source video into a schedule of short clips.
//!
//! The source is split at detected scene boundaries into clips no longer than
//! a configured maximum. Each clip is optionally watermarked and uploaded to
//! the publishing platform with a publish time drawn from a fixed daily
//! schedule. Failures are tracked per clip, so one bad clip never stops the
//! rest of the batch.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reelcut_core::batch::{run_batch, BatchRequest, Collaborators, VideoSource};
//! use reelcut_core::config::BatchConfigBuilder;
//! use reelcut_core::external::{
//!     FfmpegClipExtractor, FfmpegSceneDetector, FfmpegWatermarker, ReelsPublisher,
//!     DEFAULT_SCENE_THRESHOLD,
//! };
//!
//! let config = BatchConfigBuilder::from_env().max_clip_length_secs(45.0).build();
//! let timeouts = config.timeouts.clone();
//!
//! let detector = FfmpegSceneDetector::new(DEFAULT_SCENE_THRESHOLD, timeouts.detect())?;
//! let extractor = FfmpegClipExtractor::new(timeouts.extract());
//! let watermarker = FfmpegWatermarker::new(timeouts.watermark());
//! let publisher = ReelsPublisher::new("1234567890", "page-token", timeouts.publish())?;
//!
//! let request = BatchRequest::new(VideoSource::File("talk.mp4".into()), "Conference highlights")
//!     .with_watermark("logo.png")
//!     .with_config(config);
//! let collaborators =
//!     Collaborators::new(&detector, &extractor, &publisher).with_watermarker(&watermarker);
//!
//! let report = run_batch(&request, &collaborators)?;
//! for line in report.render() {
//!     println!("{line}");
//! }
//! # Ok::<(), reelcut_core::CoreError>(())
//! ```

pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod external;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod schedule;
pub mod scratch;
pub mod segmentation;
pub mod utils;

// Re-exports for public API
pub use batch::{BatchRequest, Collaborators, VideoSource, run_batch};
pub use config::{BatchConfig, BatchConfigBuilder, ScheduleConfig, TimeoutConfig};
pub use error::{CoreError, CoreResult};
pub use pipeline::{CancellationToken, ClipErrorKind, ClipFailure, ClipOutcome, ClipPipelineRunner};
pub use report::{BatchReport, ReportSummary};
pub use retry::{RetryPolicy, retry_with_backoff};
pub use schedule::{ScheduleSlot, assign_slot};
pub use segmentation::{ClipInterval, SceneBoundary, partition};
pub use utils::{format_duration, parse_ffmpeg_time};
