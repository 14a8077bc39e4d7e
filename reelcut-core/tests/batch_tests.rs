// reelcut-core/tests/batch_tests.rs

mod common;

use chrono::{DateTime, TimeZone, Utc};
use common::{
    MockDownloader, MockExtractor, MockPublisher, MockSceneDetector, MockWatermarker,
    create_dummy_file, instant_retry,
};
use reelcut_core::batch::{BatchRequest, Collaborators, VideoSource, run_batch};
use reelcut_core::config::{BatchConfig, BatchConfigBuilder};
use reelcut_core::error::CoreError;
use reelcut_core::events::{BatchEvent, EventDispatcher, EventHandler};
use reelcut_core::pipeline::ClipErrorKind;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 16, 12, 47).unwrap()
}

fn config(scratch_parent: &Path) -> BatchConfig {
    BatchConfigBuilder::new()
        .retry(instant_retry(1))
        .scratch_dir(scratch_parent.to_path_buf())
        .build()
}

fn scratch_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

#[test]
fn end_to_end_from_local_file() -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = tempdir()?;
    let scratch_dir = tempdir()?;
    let source = create_dummy_file(input_dir.path(), "talk.mp4");
    let logo = create_dummy_file(input_dir.path(), "logo.png");

    let detector = MockSceneDetector::with_scenes(&[(0.0, 30.0), (30.0, 120.0), (120.0, 320.0)]);
    let extractor = MockExtractor::new();
    let watermarker = MockWatermarker::new();
    let publisher = MockPublisher::new();

    let request = BatchRequest::new(VideoSource::File(source.clone()), "Highlights")
        .with_watermark(&logo)
        .with_config(config(scratch_dir.path()))
        .with_base_instant(base());
    let collaborators =
        Collaborators::new(&detector, &extractor, &publisher).with_watermarker(&watermarker);

    let report = run_batch(&request, &collaborators)?;

    assert_eq!(report.len(), 7);
    assert!(report.is_complete_success());
    assert_eq!(report.base_instant, base());
    assert_eq!(*detector.calls.lock().unwrap(), vec![source]);

    let spans: Vec<(f64, f64)> = extractor
        .calls
        .lock()
        .unwrap()
        .iter()
        .map(|&(_, start, end)| (start, end))
        .collect();
    assert_eq!(
        spans,
        vec![
            (0.0, 30.0),
            (30.0, 90.0),
            (90.0, 120.0),
            (120.0, 180.0),
            (180.0, 240.0),
            (240.0, 300.0),
            (300.0, 320.0),
        ]
    );

    let last = report.outcome(7).unwrap();
    assert_eq!(last.scheduled_at, Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap());
    assert_eq!(publisher.calls()[6].description, "Highlights 7");

    // Scratch area is gone once the batch returns
    assert_eq!(scratch_entries(scratch_dir.path()), 0);
    Ok(())
}

#[test]
fn eleventh_clip_rolls_to_next_day() {
    let input_dir = tempdir().unwrap();
    let scratch_dir = tempdir().unwrap();
    let source = create_dummy_file(input_dir.path(), "long.mp4");

    // 12 minutes in one scene -> 12 clips of 60 s
    let detector = MockSceneDetector::with_scenes(&[(0.0, 720.0)]);
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();
    let request = BatchRequest::new(VideoSource::File(source), "Part")
        .with_config(config(scratch_dir.path()))
        .with_base_instant(base());

    let report = run_batch(&request, &Collaborators::new(&detector, &extractor, &publisher)).unwrap();

    assert_eq!(report.len(), 12);
    assert_eq!(
        report.outcome(10).unwrap().scheduled_at,
        Utc.with_ymd_and_hms(2024, 5, 20, 13, 30, 0).unwrap()
    );
    assert_eq!(
        report.outcome(11).unwrap().scheduled_at,
        Utc.with_ymd_and_hms(2024, 5, 21, 9, 0, 0).unwrap()
    );
    assert_eq!(
        report.outcome(12).unwrap().scheduled_at,
        Utc.with_ymd_and_hms(2024, 5, 21, 9, 30, 0).unwrap()
    );
}

#[test]
fn missing_source_file_is_fatal() {
    let scratch_dir = tempdir().unwrap();
    let detector = MockSceneDetector::with_scenes(&[(0.0, 10.0)]);
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();
    let request = BatchRequest::new(VideoSource::File("/nonexistent/video.mp4".into()), "x")
        .with_config(config(scratch_dir.path()));

    let err = run_batch(&request, &Collaborators::new(&detector, &extractor, &publisher)).unwrap_err();

    assert!(matches!(err, CoreError::SourceAcquisitionFailed(_)));
    assert!(detector.calls.lock().unwrap().is_empty());
    assert!(publisher.calls().is_empty());
}

#[test]
fn invalid_configuration_is_fatal() {
    let input_dir = tempdir().unwrap();
    let source = create_dummy_file(input_dir.path(), "in.mp4");
    let detector = MockSceneDetector::with_scenes(&[(0.0, 10.0)]);
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();

    for bad in [
        BatchConfigBuilder::new().max_clip_length_secs(0.0).build(),
        BatchConfigBuilder::new().clips_per_day(0).build(),
        BatchConfigBuilder::new().start_hour(24).build(),
        BatchConfigBuilder::new().retry_attempts(0).build(),
    ] {
        let request = BatchRequest::new(VideoSource::File(source.clone()), "x").with_config(bad);
        let err = run_batch(&request, &Collaborators::new(&detector, &extractor, &publisher)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfiguration(_)), "got {err:?}");
    }
    assert!(detector.calls.lock().unwrap().is_empty());
}

#[test]
fn scene_detection_failure_is_fatal_and_reported() {
    let input_dir = tempdir().unwrap();
    let scratch_dir = tempdir().unwrap();
    let source = create_dummy_file(input_dir.path(), "in.mp4");
    let detector = MockSceneDetector::failing("corrupt stream");
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();
    let recorder = Arc::new(Recorder::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_handler(recorder.clone());

    let request = BatchRequest::new(VideoSource::File(source), "x").with_config(config(scratch_dir.path()));
    let collaborators = Collaborators::new(&detector, &extractor, &publisher).with_events(&dispatcher);

    let err = run_batch(&request, &collaborators).unwrap_err();

    assert!(matches!(err, CoreError::SceneDetectionFailed(ref msg) if msg == "corrupt stream"));
    assert!(extractor.calls.lock().unwrap().is_empty());
    assert_eq!(*recorder.0.lock().unwrap(), vec!["failed"]);
    assert_eq!(scratch_entries(scratch_dir.path()), 0);
}

#[test]
fn missing_watermark_asset_is_invalid_configuration() {
    let input_dir = tempdir().unwrap();
    let scratch_dir = tempdir().unwrap();
    let source = create_dummy_file(input_dir.path(), "in.mp4");
    let detector = MockSceneDetector::with_scenes(&[(0.0, 10.0)]);
    let extractor = MockExtractor::new();
    let watermarker = MockWatermarker::new();
    let publisher = MockPublisher::new();

    let request = BatchRequest::new(VideoSource::File(source), "x")
        .with_watermark(input_dir.path().join("missing.png"))
        .with_config(config(scratch_dir.path()));
    let collaborators =
        Collaborators::new(&detector, &extractor, &publisher).with_watermarker(&watermarker);

    let err = run_batch(&request, &collaborators).unwrap_err();
    assert!(matches!(err, CoreError::InvalidConfiguration(_)));
    assert!(detector.calls.lock().unwrap().is_empty());
}

#[test]
fn url_source_is_downloaded_into_scratch_with_retry() {
    let scratch_dir = tempdir().unwrap();
    let detector = MockSceneDetector::with_scenes(&[(0.0, 20.0)]);
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();
    let downloader = MockDownloader::failing(1);

    let config = BatchConfigBuilder::new()
        .retry(instant_retry(2))
        .scratch_dir(scratch_dir.path().to_path_buf())
        .build();
    let request = BatchRequest::new(VideoSource::Url("https://video.test/watch?v=1".into()), "x")
        .with_config(config);
    let collaborators =
        Collaborators::new(&detector, &extractor, &publisher).with_downloader(&downloader);

    let report = run_batch(&request, &collaborators).unwrap();

    assert!(report.is_complete_success());
    assert_eq!(downloader.calls.lock().unwrap().len(), 2);
    let detected = detector.calls.lock().unwrap()[0].clone();
    assert!(detected.starts_with(scratch_dir.path()));
    assert!(detected.ends_with("Downloaded Video.mp4"));
    // Downloaded source is cleaned up with the rest of the scratch area
    assert!(!detected.exists());
}

#[test]
fn url_source_failures_are_fatal() {
    let scratch_dir = tempdir().unwrap();
    let detector = MockSceneDetector::with_scenes(&[(0.0, 20.0)]);
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();
    let request = BatchRequest::new(VideoSource::Url("https://video.test/v".into()), "x")
        .with_config(config(scratch_dir.path()));

    // No downloader at all
    let err = run_batch(&request, &Collaborators::new(&detector, &extractor, &publisher)).unwrap_err();
    assert!(matches!(err, CoreError::SourceAcquisitionFailed(_)));

    // Downloader that keeps failing
    let downloader = MockDownloader::failing(u32::MAX);
    let collaborators =
        Collaborators::new(&detector, &extractor, &publisher).with_downloader(&downloader);
    let err = run_batch(&request, &collaborators).unwrap_err();
    assert!(matches!(err, CoreError::SourceAcquisitionFailed(_)));
    assert!(detector.calls.lock().unwrap().is_empty());
}

#[test]
fn keep_scratch_leaves_artifacts() {
    let input_dir = tempdir().unwrap();
    let scratch_dir = tempdir().unwrap();
    let source = create_dummy_file(input_dir.path(), "in.mp4");
    let detector = MockSceneDetector::with_scenes(&[(0.0, 10.0), (10.0, 20.0)]);
    let extractor = MockExtractor::new();
    let publisher = MockPublisher::new();

    let config = BatchConfigBuilder::new()
        .retry(instant_retry(1))
        .scratch_dir(scratch_dir.path().to_path_buf())
        .keep_scratch(true)
        .build();
    let request = BatchRequest::new(VideoSource::File(source), "x").with_config(config);
    let report = run_batch(&request, &Collaborators::new(&detector, &extractor, &publisher)).unwrap();

    let kept = scratch_dir.path().join(format!("reelcut_{}", report.batch_id));
    assert!(kept.join("scene_001.mp4").is_file());
    assert!(kept.join("scene_002.mp4").is_file());
}

#[test]
fn failed_clips_do_not_fail_the_batch() {
    let input_dir = tempdir().unwrap();
    let scratch_dir = tempdir().unwrap();
    let source = create_dummy_file(input_dir.path(), "in.mp4");
    let detector = MockSceneDetector::with_scenes(&[(0.0, 10.0), (10.0, 20.0), (20.0, 30.0)]);
    let extractor = MockExtractor::failing(&[1], u32::MAX);
    let publisher = MockPublisher::failing(&[3], u32::MAX);
    let recorder = Arc::new(Recorder::default());
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_handler(recorder.clone());

    let request = BatchRequest::new(VideoSource::File(source), "x").with_config(config(scratch_dir.path()));
    let collaborators = Collaborators::new(&detector, &extractor, &publisher).with_events(&dispatcher);
    let report = run_batch(&request, &collaborators).unwrap();

    assert_eq!(report.outcome(1).unwrap().error_kind(), Some(ClipErrorKind::ExtractionFailed));
    assert!(report.outcome(2).unwrap().is_published());
    assert_eq!(report.outcome(3).unwrap().error_kind(), Some(ClipErrorKind::PublishFailed));
    let summary = report.summary();
    assert_eq!((summary.published, summary.failed()), (1, 2));

    let events = recorder.0.lock().unwrap().clone();
    assert_eq!(events.first().map(String::as_str), Some("started 3"));
    assert_eq!(events.last().map(String::as_str), Some("complete 1/2/0"));
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl EventHandler for Recorder {
    fn handle(&self, event: &BatchEvent) {
        let entry = match event {
            BatchEvent::BatchStarted { total_clips, .. } => format!("started {total_clips}"),
            BatchEvent::ClipStarted { .. } | BatchEvent::ClipFinished { .. } => return,
            BatchEvent::BatchComplete {
                published,
                failed,
                cancelled,
                ..
            } => format!("complete {published}/{failed}/{cancelled}"),
            BatchEvent::BatchFailed { .. } => "failed".to_string(),
        };
        self.0.lock().unwrap().push(entry);
    }
}
