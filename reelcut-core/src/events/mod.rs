//! Batch progress events.
//!
//! The batch runner reports what it is doing through an `EventDispatcher`.
//! Handlers decide how to present it: the CLI draws a progress bar, the
//! JSON handler writes one object per line for other programs to consume.
//! Handlers may be called from several worker threads at once.

use crate::pipeline::{ClipErrorKind, ClipOutcome};

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub mod json_handler;

pub use json_handler::JsonProgressHandler;

#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// Scenes are known and the clip list is fixed.
    BatchStarted {
        batch_id: String,
        source: String,
        scene_count: usize,
        total_clips: usize,
        base_instant: DateTime<Utc>,
    },

    ClipStarted {
        clip_index: usize,
        total_clips: usize,
    },

    ClipFinished {
        total_clips: usize,
        outcome: ClipOutcome,
    },

    BatchComplete {
        batch_id: String,
        published: usize,
        failed: usize,
        cancelled: usize,
        elapsed: Duration,
    },

    /// The batch stopped before processing any clip.
    BatchFailed {
        message: String,
    },
}

impl BatchEvent {
    /// Failure kind of a finished clip, if it failed.
    pub fn failure_kind(&self) -> Option<ClipErrorKind> {
        match self {
            BatchEvent::ClipFinished { outcome, .. } => outcome.error.as_ref().map(|e| e.kind),
            _ => None,
        }
    }
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &BatchEvent);
}

pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn has_handlers(&self) -> bool {
        !self.handlers.is_empty()
    }

    pub fn emit(&self, event: BatchEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
