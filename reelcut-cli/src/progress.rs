// ============================================================================
// reelcut-cli/src/progress.rs
// ============================================================================
//
// PROGRESS REPORTING: Batch progress bar for the terminal
//
// `ProgressBarHandler` turns the core's batch events into one indicatif bar
// counting finished clips. Failed clips are printed above the bar as they
// happen so they are not lost when the bar is cleared.
//
// AI-ASSISTANT-INFO: indicatif progress bar driven by batch events

// ---- Internal crate imports ----
use crate::terminal::styling;

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reelcut_core::events::{BatchEvent, EventHandler};

// ---- Standard library imports ----
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const BAR_TEMPLATE: &str = "  {spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} clips {msg}";

/// Event handler drawing a progress bar on stderr.
pub struct ProgressBarHandler {
    bar: ProgressBar,
    failed: AtomicUsize,
}

impl ProgressBarHandler {
    /// With `visible` false the bar is never drawn but events are still
    /// tracked, which keeps verbose logging readable.
    pub fn new(visible: bool) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::hidden());
        let bar_style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##.");
        bar.set_style(bar_style);
        if visible {
            bar.set_draw_target(ProgressDrawTarget::stderr());
        }
        Self {
            bar,
            failed: AtomicUsize::new(0),
        }
    }

    /// Clips finished so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }

    /// Clips finished without being published.
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }
}

impl EventHandler for ProgressBarHandler {
    fn handle(&self, event: &BatchEvent) {
        match event {
            BatchEvent::BatchStarted { total_clips, .. } => {
                self.bar.set_length(*total_clips as u64);
                self.bar.set_position(0);
                self.bar.enable_steady_tick(Duration::from_millis(120));
            }
            BatchEvent::ClipStarted { clip_index, .. } => {
                self.bar.set_message(format!("(clip {clip_index})"));
            }
            BatchEvent::ClipFinished { outcome, .. } => {
                if let Some(kind) = event.failure_kind() {
                    let failed = self.failed.fetch_add(1, Ordering::Relaxed) + 1;
                    let message = outcome.error.as_ref().map_or("", |f| f.message.as_str());
                    self.bar.println(format!(
                        "{}{} Clip {}: {}: {}",
                        styling::STATUS_INDENT,
                        style(styling::ERROR_SYMBOL).red().for_stderr(),
                        outcome.clip_index,
                        kind,
                        message
                    ));
                    self.bar.set_message(format!("({failed} failed)"));
                }
                self.bar.inc(1);
            }
            BatchEvent::BatchComplete { .. } | BatchEvent::BatchFailed { .. } => {
                self.bar.finish_and_clear();
            }
        }
    }
}
