//! OANDA v3 candle fetcher
//!
//! OANDA returns up to 5000 candles per request and marks the still-forming
//! candle as incomplete. The adapter keeps only complete candles at or after
//! the cursor, and converts RFC3339 candle times to epoch milliseconds.

use async_trait::async_trait;
use chrono::DateTime;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use super::http::RestClient;
use super::{ExchangeFetcher, FetcherError, FetcherResult};
use crate::{Candle, Interval, Provider};

const OANDA_BASE_URL: &str = "https://api-fxpractice.oanda.com";

/// Maximum candles per OANDA request.
const PAGE_COUNT: usize = 5000;

#[derive(Debug, Deserialize)]
struct CandlesResponse {
    candles: Vec<OandaCandle>,
}

#[derive(Debug, Deserialize)]
struct OandaCandle {
    complete: bool,
    time: String,
    mid: MidPrices,
}

#[derive(Debug, Deserialize)]
struct MidPrices {
    o: Decimal,
    h: Decimal,
    l: Decimal,
    c: Decimal,
}

#[derive(Debug, Deserialize)]
struct InstrumentsResponse {
    instruments: Vec<Instrument>,
}

#[derive(Debug, Deserialize)]
struct Instrument {
    name: String,
}

/// OANDA candle fetcher
pub struct OandaFetcher {
    http: RestClient,
    account_id: String,
}

impl OandaFetcher {
    /// Create a fetcher authenticated with the given token and account.
    pub fn new(token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self {
            http: RestClient::new(OANDA_BASE_URL).with_bearer_token(token),
            account_id: account_id.into(),
        }
    }

    /// Create with a custom base URL (for testing).
    #[allow(dead_code)]
    pub fn new_with_base_url(
        token: impl Into<String>,
        account_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: RestClient::new(base_url).with_bearer_token(token),
            account_id: account_id.into(),
        }
    }
}

/// Parse an OANDA RFC3339 candle time into epoch milliseconds.
fn parse_candle_time(time: &str) -> FetcherResult<i64> {
    DateTime::parse_from_rfc3339(time)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| FetcherError::ParseError(format!("Invalid candle time '{time}': {e}")))
}

#[async_trait]
impl ExchangeFetcher for OandaFetcher {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>> {
        let endpoint = format!("/v3/instruments/{symbol}/candles");
        let params = [
            ("granularity", interval.oanda_granularity().to_string()),
            ("count", PAGE_COUNT.to_string()),
            // OANDA takes the cursor in whole seconds.
            ("from", (since_ms / 1000).to_string()),
        ];

        debug!(symbol, %interval, since_ms, "fetching oanda candles page");

        let response: CandlesResponse = self.http.get(&endpoint, &params).await?;

        let mut candles = Vec::with_capacity(response.candles.len());
        for candle in response.candles {
            if !candle.complete {
                continue;
            }
            let time = parse_candle_time(&candle.time)?;
            if time < since_ms {
                continue;
            }
            candles.push(Candle {
                time,
                open: candle.mid.o,
                high: candle.mid.h,
                low: candle.mid.l,
                close: candle.mid.c,
            });
        }

        Ok(candles)
    }

    async fn list_symbols(&self) -> FetcherResult<Vec<String>> {
        let endpoint = format!("/v3/accounts/{}/instruments", self.account_id);
        let params: Vec<(&str, String)> = vec![];
        let response: InstrumentsResponse = self.http.get(&endpoint, &params).await?;

        Ok(response
            .instruments
            .into_iter()
            .map(|instrument| instrument.name)
            .collect())
    }

    fn provider(&self) -> Provider {
        Provider::Oanda
    }
}
