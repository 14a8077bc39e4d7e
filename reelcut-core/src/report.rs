//! Batch report: per-clip outcomes in clip order.
//!
//! Outcomes may arrive in any order (parallel workers finish when they
//! finish); the report keys them by clip index so iteration, rendering and
//! JSON output always follow clip order.

use crate::error::CoreResult;
use crate::pipeline::{ClipErrorKind, ClipOutcome};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timestamp format used in rendered report lines.
pub const RENDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub batch_id: String,
    pub base_instant: DateTime<Utc>,
    outcomes: BTreeMap<usize, ClipOutcome>,
}

/// Counts of clips per terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub published: usize,
    pub extraction_failed: usize,
    pub watermark_failed: usize,
    pub publish_failed: usize,
    pub cancelled: usize,
}

impl ReportSummary {
    /// Clips that failed for a reason other than cancellation.
    pub fn failed(&self) -> usize {
        self.extraction_failed + self.watermark_failed + self.publish_failed
    }
}

impl BatchReport {
    pub fn new(
        batch_id: impl Into<String>,
        base_instant: DateTime<Utc>,
        outcomes: impl IntoIterator<Item = ClipOutcome>,
    ) -> Self {
        let outcomes = outcomes
            .into_iter()
            .map(|outcome| (outcome.clip_index, outcome))
            .collect();
        Self {
            batch_id: batch_id.into(),
            base_instant,
            outcomes,
        }
    }

    /// Outcomes ordered by clip index.
    pub fn outcomes(&self) -> impl Iterator<Item = &ClipOutcome> {
        self.outcomes.values()
    }

    pub fn outcome(&self, clip_index: usize) -> Option<&ClipOutcome> {
        self.outcomes.get(&clip_index)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// True when every clip was published. An empty batch counts as success.
    pub fn is_complete_success(&self) -> bool {
        self.outcomes().all(ClipOutcome::is_published)
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.len(),
            ..ReportSummary::default()
        };
        for outcome in self.outcomes() {
            match outcome.error_kind() {
                None => summary.published += 1,
                Some(ClipErrorKind::ExtractionFailed) => summary.extraction_failed += 1,
                Some(ClipErrorKind::WatermarkFailed) => summary.watermark_failed += 1,
                Some(ClipErrorKind::PublishFailed) => summary.publish_failed += 1,
                Some(ClipErrorKind::Cancelled) => summary.cancelled += 1,
            }
        }
        summary
    }

    /// One human-readable line per clip.
    ///
    /// ```text
    /// Clip 1 scheduled for 2024-05-20 09:00:00 UTC: {"id":"123"}
    /// Clip 2 scheduled for 2024-05-20 09:30:00 UTC: PublishFailed: HTTP 400
    /// ```
    pub fn render(&self) -> Vec<String> {
        self.outcomes().map(render_line).collect()
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn render_line(outcome: &ClipOutcome) -> String {
    let when = outcome.scheduled_at.format(RENDER_TIME_FORMAT);
    let result = match (&outcome.error, &outcome.remote_result) {
        (Some(failure), _) => format!("{}: {}", failure.kind, failure.message),
        (None, Some(body)) => body.trim().to_string(),
        (None, None) => String::new(),
    };
    format!("Clip {} scheduled for {} UTC: {}", outcome.clip_index, when, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ClipFailure;
    use crate::segmentation::ClipInterval;
    use chrono::TimeZone;

    fn outcome(index: usize, error: Option<ClipErrorKind>) -> ClipOutcome {
        ClipOutcome {
            clip_index: index,
            interval: ClipInterval {
                index,
                start: (index - 1) as f64 * 10.0,
                end: index as f64 * 10.0,
                source_scene_index: 0,
            },
            scheduled_at: Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0).unwrap()
                + chrono::Duration::minutes(30 * (index as i64 - 1)),
            watermarked: error.is_none(),
            remote_result: error.is_none().then(|| format!("{{\"id\":\"{index}\"}}")),
            error: error.map(|kind| ClipFailure {
                kind,
                message: "boom".to_string(),
            }),
        }
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 7, 0, 0).unwrap()
    }

    #[test]
    fn out_of_order_outcomes_are_sorted() {
        let report = BatchReport::new(
            "b1",
            base(),
            vec![outcome(3, None), outcome(1, None), outcome(2, None)],
        );
        let order: Vec<usize> = report.outcomes().map(|o| o.clip_index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn render_lines() {
        let report = BatchReport::new(
            "b1",
            base(),
            vec![outcome(1, None), outcome(2, Some(ClipErrorKind::PublishFailed))],
        );
        assert_eq!(
            report.render(),
            vec![
                "Clip 1 scheduled for 2024-05-20 09:00:00 UTC: {\"id\":\"1\"}".to_string(),
                "Clip 2 scheduled for 2024-05-20 09:30:00 UTC: PublishFailed: boom".to_string(),
            ]
        );
    }

    #[test]
    fn summary_counts_each_state() {
        let report = BatchReport::new(
            "b1",
            base(),
            vec![
                outcome(1, None),
                outcome(2, Some(ClipErrorKind::ExtractionFailed)),
                outcome(3, Some(ClipErrorKind::WatermarkFailed)),
                outcome(4, Some(ClipErrorKind::PublishFailed)),
                outcome(5, Some(ClipErrorKind::Cancelled)),
                outcome(6, None),
            ],
        );
        let summary = report.summary();
        assert_eq!(summary.total, 6);
        assert_eq!(summary.published, 2);
        assert_eq!(summary.failed(), 3);
        assert_eq!(summary.cancelled, 1);
        assert!(!report.is_complete_success());
        assert_eq!(report.outcome(3).unwrap().error_kind(), Some(ClipErrorKind::WatermarkFailed));
        assert!(report.outcome(7).is_none());
    }

    #[test]
    fn json_round_trips() {
        let report = BatchReport::new("b1", base(), vec![outcome(1, None), outcome(2, None)]);
        assert!(report.is_complete_success());
        let json = report.to_json().unwrap();
        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn empty_report() {
        let report = BatchReport::new("b1", base(), Vec::new());
        assert!(report.is_empty());
        assert!(report.render().is_empty());
        assert!(report.is_complete_success());
    }
}
