//! Resumable download orchestration
//!
//! The downloader drives the paginated fetch loop for one symbol:
//!
//! 1. **Resume**: the cache file's last row determines the cursor
//! 2. **Fetch loop**: pages from the [`crate::fetcher::ExchangeFetcher`] are
//!    accumulated until the series is exhausted or the batch cap is hit
//! 3. **Retry**: transient fetch errors are retried at the same cursor under
//!    a bounded [`config::RetryPolicy`]
//! 4. **Flush**: the accumulator is serialized to the cache at well-defined
//!    points, so a killed process loses at most one run's accumulator
//!
//! The caller loops [`Downloader::download_pair`] while it returns `true`.

pub mod config;
pub mod executor;
pub mod job;

pub use config::RetryPolicy;
pub use executor::Downloader;
pub use job::PairJob;

use crate::output::OutputError;

/// Download errors
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Fetching failed repeatedly at one cursor position
    #[error("fetch failed after {attempts} attempts at cursor {cursor}: {last_error}")]
    RetriesExhausted {
        /// Attempts made before giving up
        attempts: u32,
        /// Cursor position the fetches were retried at
        cursor: i64,
        /// The final fetch error
        last_error: String,
    },

    /// Cache file error
    #[error("output error: {0}")]
    OutputError(#[from] OutputError),
}
