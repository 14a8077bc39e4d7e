//! JSON progress handler for structured progress output
//!
//! Writes one JSON object per event (NDJSON) so wrappers and schedulers can
//! follow a batch without parsing log lines.

use super::{BatchEvent, EventHandler};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that outputs progress events as structured JSON to stdout
pub struct JsonProgressHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonProgressHandler {
    /// Create a new JSON progress handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a new JSON progress handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

impl EventHandler for JsonProgressHandler {
    fn handle(&self, event: &BatchEvent) {
        let timestamp = Self::get_timestamp();

        let value = match event {
            BatchEvent::BatchStarted {
                batch_id,
                source,
                scene_count,
                total_clips,
                base_instant,
            } => json!({
                "type": "batch_started",
                "batch_id": batch_id,
                "source": source,
                "scene_count": scene_count,
                "total_clips": total_clips,
                "base_instant": base_instant.to_rfc3339(),
                "timestamp": timestamp
            }),

            BatchEvent::ClipStarted {
                clip_index,
                total_clips,
            } => json!({
                "type": "clip_started",
                "clip_index": clip_index,
                "total_clips": total_clips,
                "timestamp": timestamp
            }),

            BatchEvent::ClipFinished {
                total_clips,
                outcome,
            } => json!({
                "type": "clip_finished",
                "clip_index": outcome.clip_index,
                "total_clips": total_clips,
                "start": outcome.interval.start,
                "end": outcome.interval.end,
                "scheduled_at": outcome.scheduled_at.to_rfc3339(),
                "watermarked": outcome.watermarked,
                "published": outcome.is_published(),
                "error_kind": outcome.error.as_ref().map(|e| e.kind.to_string()),
                "error": outcome.error.as_ref().map(|e| e.message.clone()),
                "timestamp": timestamp
            }),

            BatchEvent::BatchComplete {
                batch_id,
                published,
                failed,
                cancelled,
                elapsed,
            } => json!({
                "type": "batch_complete",
                "batch_id": batch_id,
                "published": published,
                "failed": failed,
                "cancelled": cancelled,
                "elapsed_seconds": elapsed.as_secs_f64(),
                "timestamp": timestamp
            }),

            BatchEvent::BatchFailed { message } => json!({
                "type": "batch_failed",
                "message": message,
                "timestamp": timestamp
            }),
        };

        self.write_json(value);
    }
}

impl Default for JsonProgressHandler {
    fn default() -> Self {
        Self::new()
    }
}
