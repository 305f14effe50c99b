//! Download configuration constants and retry policy

use std::time::Duration;

/// Per-run accumulator cap. A backfill longer than this returns
/// `has_more = true` so the caller re-invokes from the extended cache instead
/// of holding unbounded memory for one run.
pub const BATCH_CAP: usize = 50_000;

/// Cursor advance past the last candle of a page, so the boundary candle is
/// not fetched twice. All candle times are normalized to milliseconds, so one
/// second is always a safe step smaller than any supported interval.
pub const CURSOR_EPSILON_MS: i64 = 1000;

/// Default maximum fetch attempts at one cursor position before the run
/// gives up. The cursor itself is never abandoned: accumulated candles are
/// flushed, and the next run resumes from the same position.
pub const MAX_RETRIES: u32 = 5;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay in milliseconds, capping the exponential curve.
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// Bounded retry strategy for transient fetch errors inside the download
/// loop. Replaces the retry-forever behavior this tool historically had: a
/// permanent provider outage now fails the run after `max_attempts` instead
/// of spinning silently.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts at one cursor position before giving up
    pub max_attempts: u32,
    /// First backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Upper bound for the exponential backoff in milliseconds
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Exponential backoff delay for the given zero-based retry count.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let delay_ms = self
            .initial_backoff_ms
            .saturating_mul(2u64.saturating_pow(retry_count));
        Duration::from_millis(delay_ms.min(self.max_backoff_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            initial_backoff_ms: INITIAL_BACKOFF_MS,
            max_backoff_ms: MAX_BACKOFF_MS,
        }
    }
}
