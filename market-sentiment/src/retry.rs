//! Exponential backoff for failable async operations.
//!
//! Delays double after every failed attempt with no jitter and no cap;
//! the retry count is the only bound. Waiting goes through
//! `tokio::time::sleep`, so other tasks keep running during backoff.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry budget and starting delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retries after the first attempt (3 ⇒ up to 4 attempts)
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, initial_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay slept before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2_u32.checked_pow(retry).unwrap_or(u32::MAX))
    }
}

/// Run `operation` until it succeeds or the retry budget is spent
///
/// The error from the final attempt is returned unchanged.
/// `label` only appears in log lines.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut retries_left = config.max_retries;
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!("{} succeeded on attempt {}", label, attempt);
                }
                return Ok(value);
            }
            Err(e) if retries_left == 0 => {
                tracing::error!(
                    "{} failed after {} attempt(s): {}",
                    label,
                    attempt,
                    e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = config.delay_for(attempt - 1);
                tracing::warn!(
                    "{} failed (attempt {}/{}), retrying in {}ms: {}",
                    label,
                    attempt,
                    config.max_attempts(),
                    delay.as_millis(),
                    e
                );
                sleep(delay).await;
                retries_left -= 1;
                attempt += 1;
            }
        }
    }
}
