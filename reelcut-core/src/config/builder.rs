// ============================================================================
// reelcut-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for BatchConfig
//
// Fluent construction of BatchConfig on top of the defaults. The builder
// does not validate; call `BatchConfig::validate` (run_batch does) before
// using the result.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{BatchConfig, TimeoutConfig};
use crate::retry::RetryPolicy;

/// Builder for creating BatchConfig instances.
///
/// # Examples
///
/// ```rust
/// use reelcut_core::config::BatchConfigBuilder;
///
/// let config = BatchConfigBuilder::new()
///     .max_clip_length_secs(30.0)
///     .retry_attempts(5)
///     .concurrency(2)
///     .build();
/// assert_eq!(config.retry.attempts, 5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    /// Creates a new builder seeded with `BatchConfig::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder seeded with `BatchConfig::from_env()`.
    pub fn from_env() -> Self {
        Self {
            config: BatchConfig::from_env(),
        }
    }

    /// Sets the maximum clip length.
    ///
    /// # Arguments
    ///
    /// * `secs` - Upper bound on a clip's duration in seconds (must be > 0)
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn max_clip_length_secs(mut self, secs: f64) -> Self {
        self.config.max_clip_length_secs = secs;
        self
    }

    /// Sets how many clips may be scheduled per calendar day.
    pub fn clips_per_day(mut self, clips: u32) -> Self {
        self.config.schedule.clips_per_day = clips;
        self
    }

    /// Sets the UTC hour of the first slot of each day.
    pub fn start_hour(mut self, hour: u32) -> Self {
        self.config.schedule.start_hour = hour;
        self
    }

    /// Sets the spacing between slots of the same day.
    pub fn interval_minutes(mut self, minutes: u32) -> Self {
        self.config.schedule.interval_minutes = minutes;
        self
    }

    /// Replaces the whole retry policy.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.config.retry = policy;
        self
    }

    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.attempts = attempts;
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.config.timeouts = timeouts;
        self
    }

    /// Sets the number of clips processed at once.
    ///
    /// # Arguments
    ///
    /// * `workers` - 1 for strictly sequential processing, more for a bounded
    ///   worker pool. The report keeps clip order either way.
    ///
    /// # Returns
    ///
    /// * Self for method chaining
    pub fn concurrency(mut self, workers: usize) -> Self {
        self.config.concurrency = workers;
        self
    }

    /// Sets the parent directory for the per-batch scratch area.
    pub fn scratch_dir(mut self, dir: PathBuf) -> Self {
        self.config.scratch_dir = Some(dir);
        self
    }

    pub fn keep_scratch(mut self, keep: bool) -> Self {
        self.config.keep_scratch = keep;
        self
    }

    /// Builds the BatchConfig.
    pub fn build(self) -> BatchConfig {
        self.config
    }
}
