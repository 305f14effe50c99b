//! FTX-style venue candle fetcher
//!
//! The venue pages by explicit time windows of `5000 x resolution` seconds.
//! Some windows over illiquid or pre-listing periods come back empty even
//! though later windows hold data, so an empty window whose end is still in
//! the past is skipped (cursor advanced to the window end) instead of being
//! treated as series exhaustion.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::future::Future;
use tracing::debug;

use super::http::RestClient;
use super::{ExchangeFetcher, FetcherError, FetcherResult};
use crate::{Candle, Interval, Provider};

const FTX_BASE_URL: &str = "https://ftx.com";

/// Candles per request window.
const PAGE_LIMIT: usize = 5000;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    result: T,
}

#[derive(Debug, Deserialize)]
struct FtxCandle {
    /// Epoch milliseconds (the API reports it as a float)
    time: f64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
}

#[derive(Debug, Deserialize)]
struct FutureInfo {
    name: String,
}

/// FTX-style candle fetcher
pub struct FtxFetcher {
    http: RestClient,
}

impl FtxFetcher {
    /// Create a new fetcher.
    pub fn new() -> Self {
        Self {
            http: RestClient::new(FTX_BASE_URL),
        }
    }

    /// Create with a custom base URL (for testing).
    #[allow(dead_code)]
    pub fn new_with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: RestClient::new(base_url),
        }
    }
}

impl Default for FtxFetcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Page through fixed windows of `window_s` seconds starting at `start_s`,
/// skipping empty windows that lie entirely in the past (gap-skip).
///
/// Returns the window start that finally produced the page together with the
/// page itself. An empty page is only returned once the window reaches `now_s`,
/// which is what terminates the downloader's loop.
pub(crate) async fn fetch_with_gap_skip<F, Fut>(
    mut start_s: i64,
    window_s: i64,
    now_s: i64,
    mut fetch_window: F,
) -> FetcherResult<(i64, Vec<Candle>)>
where
    F: FnMut(i64, i64) -> Fut,
    Fut: Future<Output = FetcherResult<Vec<Candle>>>,
{
    loop {
        let end_s = start_s + window_s;
        let page = fetch_window(start_s, end_s).await?;

        if page.is_empty() && end_s < now_s {
            debug!(start_s, end_s, "empty window in the past, skipping gap");
            start_s = end_s;
            continue;
        }

        return Ok((start_s, page));
    }
}

#[async_trait]
impl ExchangeFetcher for FtxFetcher {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>> {
        let resolution_s = interval.resolution_seconds();
        let window_s = PAGE_LIMIT as i64 * resolution_s;
        let start_s = since_ms / 1000;
        let now_s = Utc::now().timestamp();

        let http = self.http.clone();
        let endpoint = format!("/api/markets/{symbol}/candles");

        let (_, page) = fetch_with_gap_skip(start_s, window_s, now_s, move |start, end| {
            let http = http.clone();
            let endpoint = endpoint.clone();
            async move {
                let params = [
                    ("resolution", resolution_s.to_string()),
                    ("limit", PAGE_LIMIT.to_string()),
                    ("start_time", start.to_string()),
                    ("end_time", end.to_string()),
                ];
                let response: ApiResponse<Vec<FtxCandle>> = http.get(&endpoint, &params).await?;
                if !response.success {
                    return Err(FetcherError::ApiError(
                        "candles request reported failure".to_string(),
                    ));
                }
                Ok(response
                    .result
                    .into_iter()
                    .map(|c| Candle {
                        time: c.time as i64,
                        open: c.open,
                        high: c.high,
                        low: c.low,
                        close: c.close,
                    })
                    .collect())
            }
        })
        .await?;

        Ok(page)
    }

    async fn list_symbols(&self) -> FetcherResult<Vec<String>> {
        let params: Vec<(&str, String)> = vec![];
        let response: ApiResponse<Vec<FutureInfo>> = self.http.get("/api/futures", &params).await?;
        if !response.success {
            return Err(FetcherError::ApiError(
                "futures listing reported failure".to_string(),
            ));
        }

        Ok(response
            .result
            .into_iter()
            .map(|f| f.name)
            .filter(|name| name.ends_with("-PERP"))
            .collect())
    }

    fn provider(&self) -> Provider {
        Provider::Ftx
    }
}
