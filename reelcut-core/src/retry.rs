//! Bounded retry with exponential backoff for collaborator calls.
//!
//! Every call the pipeline makes to an external tool (extract, watermark,
//! publish, download) goes through [`retry_with_backoff`]. Timeouts are
//! enforced by the collaborators themselves; this module only decides
//! whether and when to try again.

use crate::error::{CoreError, CoreResult};

use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};

use std::time::Duration;

/// Default number of attempts per collaborator call (first try included).
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default delay before the first retry, in milliseconds.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 500;

/// Default ceiling for a single backoff delay, in milliseconds.
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 10_000;

/// Default growth factor between consecutive delays.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub attempts: u32,

    /// Delay before the second attempt.
    pub initial_backoff_ms: u64,

    /// Upper bound on any single delay.
    pub max_backoff_ms: u64,

    /// Factor applied to the delay after each failed retry.
    pub backoff_multiplier: f64,

    /// Randomize each delay in `[delay/2, delay]` to spread retries out.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries once and never sleeps.
    pub fn no_retry() -> Self {
        Self {
            attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.attempts == 0 {
            return Err(CoreError::InvalidConfiguration(
                "retry attempts must be at least 1".to_string(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(CoreError::InvalidConfiguration(format!(
                "backoff multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(CoreError::InvalidConfiguration(format!(
                "initial backoff ({} ms) exceeds max backoff ({} ms)",
                self.initial_backoff_ms, self.max_backoff_ms
            )));
        }
        Ok(())
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based),
    /// before jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.backoff_multiplier.powi(attempt as i32);
        let millis = (self.initial_backoff_ms as f64 * factor).min(self.max_backoff_ms as f64);
        Duration::from_millis(millis as u64)
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let millis = delay.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(millis / 2..=millis))
    }
}

/// Runs `operation` until it succeeds or the policy's attempts are used up.
///
/// Returns the last error when every attempt fails. `label` only appears in
/// log output.
pub fn retry_with_backoff<T, F>(policy: &RetryPolicy, label: &str, mut operation: F) -> CoreResult<T>
where
    F: FnMut(u32) -> CoreResult<T>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 >= attempts => return Err(err),
            Err(err) => {
                let delay = policy.jittered(policy.delay_for(attempt));
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {} ms",
                    label,
                    attempt + 1,
                    attempts,
                    err,
                    delay.as_millis()
                );
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
                attempt += 1;
            }
        }
    }
}
