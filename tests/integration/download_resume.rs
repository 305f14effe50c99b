//! Integration tests for the resumable download loop: cursor resumption,
//! idempotent re-runs, the per-run batch cap, and bounded retries.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use candle_downloader::downloader::{Downloader, PairJob, RetryPolicy};
use candle_downloader::fetcher::{ExchangeFetcher, FetcherError, FetcherResult};
use candle_downloader::{Candle, Interval, MarketType, Provider};

fn candle(time: i64) -> Candle {
    Candle {
        time,
        open: Decimal::from(100),
        high: Decimal::from(110),
        low: Decimal::from(90),
        close: Decimal::from(105),
    }
}

fn hourly_job(start_time: i64) -> PairJob {
    PairJob::new(
        "BTCUSDT",
        Interval::OneHour,
        MarketType::Futures,
        Provider::Binance,
        start_time,
    )
}

/// Serves a fixed candle series in pages, like a provider whose history ends.
struct FixedSeriesFetcher {
    series: Vec<Candle>,
    page_size: usize,
}

#[async_trait]
impl ExchangeFetcher for FixedSeriesFetcher {
    async fn fetch_candles(
        &self,
        _symbol: &str,
        _interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>> {
        Ok(self
            .series
            .iter()
            .filter(|c| c.time >= since_ms)
            .take(self.page_size)
            .cloned()
            .collect())
    }

    async fn list_symbols(&self) -> FetcherResult<Vec<String>> {
        Ok(vec!["BTCUSDT".to_string()])
    }

    fn provider(&self) -> Provider {
        Provider::Binance
    }
}

/// Always has another full page, like a provider with unbounded history.
struct EndlessFetcher {
    page_size: usize,
}

#[async_trait]
impl ExchangeFetcher for EndlessFetcher {
    async fn fetch_candles(
        &self,
        _symbol: &str,
        interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>> {
        let step = interval.to_milliseconds();
        Ok((0..self.page_size as i64)
            .map(|i| candle(since_ms + i * step))
            .collect())
    }

    async fn list_symbols(&self) -> FetcherResult<Vec<String>> {
        Ok(vec!["BTCUSDT".to_string()])
    }

    fn provider(&self) -> Provider {
        Provider::Binance
    }
}

/// Serves a fixed number of good pages, then fails every call.
struct FlakyFetcher {
    good_pages: usize,
    calls: AtomicUsize,
    page_size: usize,
}

#[async_trait]
impl ExchangeFetcher for FlakyFetcher {
    async fn fetch_candles(
        &self,
        _symbol: &str,
        interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.good_pages {
            return Err(FetcherError::NetworkError("connection reset".to_string()));
        }
        let step = interval.to_milliseconds();
        Ok((0..self.page_size as i64)
            .map(|i| candle(since_ms + i * step))
            .collect())
    }

    async fn list_symbols(&self) -> FetcherResult<Vec<String>> {
        Ok(vec!["BTCUSDT".to_string()])
    }

    fn provider(&self) -> Provider {
        Provider::Binance
    }
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
    }
}

#[tokio::test]
async fn test_finite_series_downloads_fully_in_pages() {
    let start = 1_600_000_000_000i64;
    let series: Vec<Candle> = (0..10).map(|i| candle(start + i * 3_600_000)).collect();
    let fetcher = FixedSeriesFetcher {
        series,
        page_size: 4,
    };
    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(&fetcher, dir.path());

    let has_more = downloader.download_pair(&hourly_job(start)).await.unwrap();
    assert!(!has_more);

    let contents =
        std::fs::read_to_string(dir.path().join("BTCUSDT-1h-futures-binance-data.csv")).unwrap();
    let rows: Vec<&str> = contents.lines().skip(1).collect();
    assert_eq!(rows.len(), 10);

    // Cached timestamps are strictly increasing despite page boundaries.
    let times: Vec<i64> = rows
        .iter()
        .map(|row| row.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(times[0], start);
    assert_eq!(times[9], start + 9 * 3_600_000);
}

#[tokio::test]
async fn test_rerun_with_no_new_data_is_byte_identical() {
    let start = 1_600_000_000_000i64;
    let series: Vec<Candle> = (0..10).map(|i| candle(start + i * 3_600_000)).collect();
    let fetcher = FixedSeriesFetcher {
        series,
        page_size: 4,
    };
    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(&fetcher, dir.path());
    let job = hourly_job(start);

    downloader.download_pair(&job).await.unwrap();
    let cache_path = dir.path().join("BTCUSDT-1h-futures-binance-data.csv");
    let first_run = std::fs::read(&cache_path).unwrap();

    // The resume cursor steps past the stored boundary candle, so the second
    // run sees an empty page immediately and must not touch the file.
    let has_more = downloader.download_pair(&job).await.unwrap();
    assert!(!has_more);
    assert_eq!(std::fs::read(&cache_path).unwrap(), first_run);
}

#[tokio::test]
async fn test_resume_continues_after_newly_available_data() {
    let start = 1_600_000_000_000i64;
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("BTCUSDT-1h-futures-binance-data.csv");
    let job = hourly_job(start);

    let first_half: Vec<Candle> = (0..5).map(|i| candle(start + i * 3_600_000)).collect();
    let fetcher = FixedSeriesFetcher {
        series: first_half.clone(),
        page_size: 100,
    };
    Downloader::new(&fetcher, dir.path())
        .download_pair(&job)
        .await
        .unwrap();

    // Provider now has five more candles; the run must append only those.
    let full: Vec<Candle> = (0..10).map(|i| candle(start + i * 3_600_000)).collect();
    let fetcher = FixedSeriesFetcher {
        series: full,
        page_size: 100,
    };
    Downloader::new(&fetcher, dir.path())
        .download_pair(&job)
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&cache_path).unwrap();
    let times: Vec<i64> = contents
        .lines()
        .skip(1)
        .map(|row| row.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(times.len(), 10);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_batch_cap_reports_more_data() {
    let start = 1_600_000_000_000i64;
    let fetcher = EndlessFetcher { page_size: 1000 };
    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(&fetcher, dir.path());
    let job = hourly_job(start);

    let has_more = downloader.download_pair(&job).await.unwrap();
    assert!(has_more);

    let contents =
        std::fs::read_to_string(dir.path().join("BTCUSDT-1h-futures-binance-data.csv")).unwrap();
    assert_eq!(contents.lines().count(), 50_001); // header + capped rows
}

#[tokio::test]
async fn test_next_batch_resumes_past_the_cap() {
    let start = 1_600_000_000_000i64;
    let fetcher = EndlessFetcher { page_size: 1000 };
    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(&fetcher, dir.path());
    let job = hourly_job(start);

    downloader.download_pair(&job).await.unwrap();
    downloader.download_pair(&job).await.unwrap();

    let contents =
        std::fs::read_to_string(dir.path().join("BTCUSDT-1h-futures-binance-data.csv")).unwrap();
    let times: Vec<i64> = contents
        .lines()
        .skip(1)
        .map(|row| row.split(',').next().unwrap().parse().unwrap())
        .collect();
    assert_eq!(times.len(), 100_000);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_corrupt_cache_tail_is_never_truncated() {
    let start = 1_600_000_000_000i64;
    let dir = TempDir::new().unwrap();
    let cache_path = dir.path().join("BTCUSDT-1h-futures-binance-data.csv");
    let seeded = "timestamp,open,high,low,close\n\
                  1600000000000,100,110,90,105\n\
                  1600003600000,105,115,95,110\n\
                  garbage\n";
    std::fs::write(&cache_path, seeded).unwrap();

    let fetcher = FixedSeriesFetcher {
        series: Vec::new(),
        page_size: 100,
    };
    let downloader = Downloader::new(&fetcher, dir.path());

    // The unreadable resume point must surface as an error; treating it as a
    // fresh start would rewrite the file and destroy the cached history.
    downloader
        .download_pair(&hourly_job(start))
        .await
        .unwrap_err();
    assert_eq!(std::fs::read_to_string(&cache_path).unwrap(), seeded);
}

#[tokio::test]
async fn test_retries_exhausted_after_bounded_attempts() {
    let fetcher = FlakyFetcher {
        good_pages: 0,
        calls: AtomicUsize::new(0),
        page_size: 10,
    };
    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(&fetcher, dir.path()).with_retry_policy(fast_retry(3));

    let err = downloader
        .download_pair(&hourly_job(1_600_000_000_000))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("connection reset"));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_partial_progress_flushed_on_failure() {
    let start = 1_600_000_000_000i64;
    let fetcher = FlakyFetcher {
        good_pages: 2,
        calls: AtomicUsize::new(0),
        page_size: 10,
    };
    let dir = TempDir::new().unwrap();
    let downloader = Downloader::new(&fetcher, dir.path()).with_retry_policy(fast_retry(2));
    let job = hourly_job(start);

    downloader.download_pair(&job).await.unwrap_err();

    // The two good pages landed in the cache before the failure, so a later
    // run resumes from the last cached candle instead of the start date.
    let contents =
        std::fs::read_to_string(dir.path().join("BTCUSDT-1h-futures-binance-data.csv")).unwrap();
    assert_eq!(contents.lines().count(), 21); // header + 2 pages of 10
}
