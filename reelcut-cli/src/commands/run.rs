//! Implementation of the 'run' subcommand.
//!
//! Turns the CLI arguments into a batch configuration, wires up the
//! production collaborators and hands everything to `reelcut_core::run_batch`.

use crate::cli::RunArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::progress::ProgressBarHandler;
use crate::terminal;

use reelcut_core::config::BatchConfigBuilder;
use reelcut_core::events::{EventDispatcher, JsonProgressHandler};
use reelcut_core::external::{
    DEFAULT_SCENE_THRESHOLD, FfmpegClipExtractor, FfmpegSceneDetector, FfmpegWatermarker,
    ReelsPublisher, YtDlpDownloader, check_dependency,
};
use reelcut_core::report::RENDER_TIME_FORMAT;
use reelcut_core::{BatchConfig, BatchReport, BatchRequest, Collaborators, CoreError, VideoSource};

use log::{debug, info};
use serde_json::json;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Applies the CLI overrides on top of the environment-derived defaults.
pub fn build_config(args: &RunArgs) -> CliResult<BatchConfig> {
    let mut builder = BatchConfigBuilder::from_env().keep_scratch(args.keep_scratch);

    if let Some(secs) = args.max_length {
        builder = builder.max_clip_length_secs(secs);
    }
    if let Some(clips) = args.clips_per_day {
        builder = builder.clips_per_day(clips);
    }
    if let Some(hour) = args.start_hour {
        builder = builder.start_hour(hour);
    }
    if let Some(minutes) = args.interval_minutes {
        builder = builder.interval_minutes(minutes);
    }
    if let Some(workers) = args.concurrency {
        builder = builder.concurrency(workers);
    }
    if let Some(attempts) = args.retry_attempts {
        builder = builder.retry_attempts(attempts);
    }
    if let Some(dir) = &args.scratch_dir {
        builder = builder.scratch_dir(dir.clone());
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}

/// Resolves `--input`/`--url` into a source, checking local files up front.
pub fn resolve_source(args: &RunArgs) -> CliResult<VideoSource> {
    if let Some(path) = &args.input {
        if !path.is_file() {
            return Err(CoreError::SourceAcquisitionFailed(format!(
                "Input file '{}' does not exist",
                path.display()
            )));
        }
        return Ok(VideoSource::File(path.clone()));
    }
    args.url
        .clone()
        .map(VideoSource::Url)
        .cli_context("Either --input or --url is required")
}

/// External tools a batch from `source` needs, with their version flag.
pub fn required_tools(source: &VideoSource) -> Vec<(&'static str, &'static str)> {
    let mut tools = vec![("ffmpeg", "-version"), ("ffprobe", "-version")];
    if matches!(source, VideoSource::Url(_)) {
        tools.push(("yt-dlp", "--version"));
    }
    tools
}

/// Checks the external tools the batch will need.
fn check_dependencies(source: &VideoSource) -> CliResult<()> {
    let tools = required_tools(source);
    for (tool, version_arg) in &tools {
        check_dependency(tool, version_arg)?;
    }
    let names: Vec<&str> = tools.iter().map(|(tool, _)| *tool).collect();
    info!(
        "{}",
        terminal::format_status("Dependencies", &format!("{} found", names.join(", ")))
    );
    Ok(())
}

fn display_initialization_info(
    source: &VideoSource,
    args: &RunArgs,
    config: &BatchConfig,
    log_path: &Path,
) {
    terminal::print_section("Initialization");
    terminal::print_status("Source", &source.to_string(), false);
    terminal::print_status(
        "Max length",
        &format!("{}s", config.max_clip_length_secs),
        false,
    );
    let schedule = &config.schedule;
    terminal::print_status(
        "Schedule",
        &format!(
            "{} per day from {:02}:00 UTC, every {} min",
            schedule.clips_per_day, schedule.start_hour, schedule.interval_minutes
        ),
        false,
    );
    if let Some(asset) = &args.watermark {
        terminal::print_status("Watermark", &asset.display().to_string(), false);
    }
    terminal::print_status("Workers", &config.concurrency.to_string(), false);
    terminal::print_status("Log file", &log_path.display().to_string(), false);
}

fn display_results(report: &BatchReport, started: Instant) {
    let summary = report.summary();
    terminal::print_section("Results");
    terminal::print_status(
        "Base instant",
        &format!("{} UTC", report.base_instant.format(RENDER_TIME_FORMAT)),
        false,
    );
    for line in report.render() {
        terminal::print_sub_item(&line);
    }

    terminal::print_section("Summary");
    if report.is_complete_success() {
        terminal::print_success(&format!("Published {} clip(s)", summary.published));
    } else {
        terminal::print_status("Published", &summary.published.to_string(), true);
        terminal::print_status("Failed", &summary.failed().to_string(), true);
        if summary.cancelled > 0 {
            terminal::print_status("Cancelled", &summary.cancelled.to_string(), false);
        }
    }
    terminal::print_status(
        "Total time",
        &reelcut_core::format_duration(started.elapsed().as_secs_f64()),
        true,
    );
}

/// Runs one batch and reports the outcome of every clip.
///
/// Returns the report even when some clips failed; only batch-fatal
/// problems come back as errors.
pub fn run_batch_command(args: RunArgs, verbose: bool, log_path: &Path) -> CliResult<BatchReport> {
    let started = Instant::now();

    let config = build_config(&args)?;
    let source = resolve_source(&args)?;
    display_initialization_info(&source, &args, &config, log_path);
    check_dependencies(&source)?;

    let timeouts = config.timeouts.clone();
    let threshold = args.scene_threshold.unwrap_or(DEFAULT_SCENE_THRESHOLD);
    let detector = FfmpegSceneDetector::new(threshold, timeouts.detect())?;
    debug!("Scene threshold: {}", detector.threshold());
    let extractor = FfmpegClipExtractor::new(timeouts.extract());
    let watermarker = FfmpegWatermarker::new(timeouts.watermark());
    let publisher = ReelsPublisher::new(args.page_id.as_str(), args.page_token.as_str(), timeouts.publish())?;
    let downloader = YtDlpDownloader::new(timeouts.download());

    let mut events = EventDispatcher::new();
    if args.json {
        events.add_handler(Arc::new(JsonProgressHandler::new()));
    } else {
        events.add_handler(Arc::new(ProgressBarHandler::new(!verbose)));
    }

    let mut collaborators = Collaborators::new(&detector, &extractor, &publisher)
        .with_watermarker(&watermarker)
        .with_events(&events);
    if matches!(source, VideoSource::Url(_)) {
        collaborators = collaborators.with_downloader(&downloader);
    }

    let mut request = BatchRequest::new(source, args.description.clone()).with_config(config);
    if let Some(asset) = &args.watermark {
        request = request.with_watermark(asset.clone());
    }

    terminal::print_section("Processing");
    terminal::print_processing("Detecting scenes and publishing clips");
    let report = reelcut_core::run_batch(&request, &collaborators)?;

    display_results(&report, started);
    if args.json {
        let line = json!({ "type": "report", "report": report });
        println!("{line}");
    }
    Ok(report)
}
