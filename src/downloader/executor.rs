//! Resumable, batch-capped download loop

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::downloader::config::{RetryPolicy, BATCH_CAP, CURSOR_EPSILON_MS};
use crate::downloader::{DownloadError, PairJob};
use crate::fetcher::ExchangeFetcher;
use crate::output::{CandleCache, WriteMode};
use crate::Candle;

/// Drives the fetch loop for one symbol at a time against an injected
/// fetcher, extending the symbol's cache file per run.
pub struct Downloader<'a> {
    fetcher: &'a dyn ExchangeFetcher,
    cache_dir: PathBuf,
    retry: RetryPolicy,
}

impl<'a> Downloader<'a> {
    /// Create a downloader writing cache files under `cache_dir`.
    pub fn new(fetcher: &'a dyn ExchangeFetcher, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            cache_dir: cache_dir.into(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Download one batch for `job`, extending its cache file.
    ///
    /// Returns `true` when the batch cap was hit and more data remains: the
    /// caller re-invokes to continue from the newly extended cache.
    ///
    /// Re-running with no new provider data leaves the cache byte-identical:
    /// the resume cursor steps past the stored boundary candle, the provider
    /// returns an empty page, and an empty append is a no-op.
    pub async fn download_pair(&self, job: &PairJob) -> Result<bool, DownloadError> {
        let cache = CandleCache::new(job.cache_path(&self.cache_dir));

        let (mut cursor, mode) = match cache.last_timestamp()? {
            Some(last) => (last + CURSOR_EPSILON_MS, WriteMode::Append),
            None => (job.start_time, WriteMode::Create),
        };

        info!(
            symbol = %job.symbol,
            interval = %job.interval,
            provider = %job.provider,
            cursor,
            mode = ?mode,
            "starting download batch"
        );

        let mut accumulator: Vec<Candle> = Vec::new();
        let mut has_more = false;
        let mut retry_count = 0u32;

        loop {
            let page = match self
                .fetcher
                .fetch_candles(&job.symbol, job.interval, cursor)
                .await
            {
                Ok(page) => {
                    retry_count = 0;
                    page
                }
                Err(e) => {
                    retry_count += 1;
                    if retry_count >= self.retry.max_attempts {
                        // Keep the progress made so far; the next run resumes
                        // from the same cursor position.
                        cache.write(&accumulator, mode)?;
                        return Err(DownloadError::RetriesExhausted {
                            attempts: retry_count,
                            cursor,
                            last_error: e.to_string(),
                        });
                    }
                    let backoff = self.retry.backoff(retry_count - 1);
                    warn!(
                        symbol = %job.symbol,
                        cursor,
                        retry_count,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "fetch failed, retrying at same cursor"
                    );
                    tokio::time::sleep(backoff).await;
                    continue;
                }
            };

            if page.is_empty() {
                debug!(symbol = %job.symbol, cursor, "series exhausted");
                break;
            }

            if let Some(last) = page.last() {
                cursor = last.time + CURSOR_EPSILON_MS;
            }
            accumulator.extend(page);

            if accumulator.len() >= BATCH_CAP {
                info!(
                    symbol = %job.symbol,
                    candles = accumulator.len(),
                    cursor,
                    "batch cap reached, more data remains"
                );
                has_more = true;
                break;
            }
        }

        cache.write(&accumulator, mode)?;
        Ok(has_more)
    }

    /// Directory the cache files live in.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}
