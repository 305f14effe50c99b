//! Binance spot / futures candle fetcher
//!
//! Spot and futures differ only in base URL, endpoint paths and page size, so
//! both are one struct parameterized by [`MarketType`].

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::http::RestClient;
use super::parser::parse_klines;
use super::{ExchangeFetcher, FetcherError, FetcherResult};
use crate::{Candle, Interval, MarketType, Provider};

const SPOT_BASE_URL: &str = "https://api.binance.com";
const FUTURES_BASE_URL: &str = "https://fapi.binance.com";

const SPOT_KLINES_ENDPOINT: &str = "/api/v3/klines";
const FUTURES_KLINES_ENDPOINT: &str = "/fapi/v1/klines";

const SPOT_EXCHANGE_INFO_ENDPOINT: &str = "/api/v3/exchangeInfo";
const FUTURES_EXCHANGE_INFO_ENDPOINT: &str = "/fapi/v1/exchangeInfo";

/// Binance API page limits: futures allows 1500 klines per request, spot 500.
const SPOT_PAGE_LIMIT: usize = 500;
const FUTURES_PAGE_LIMIT: usize = 1500;

/// Binance candle fetcher
pub struct BinanceFetcher {
    http: RestClient,
    market: MarketType,
}

impl BinanceFetcher {
    /// Create a fetcher for the given market type.
    pub fn new(market: MarketType) -> Self {
        let base_url = match market {
            MarketType::Spot => SPOT_BASE_URL,
            MarketType::Futures => FUTURES_BASE_URL,
        };
        Self {
            http: RestClient::new(base_url),
            market,
        }
    }

    /// Create with a custom base URL (for testing).
    #[allow(dead_code)]
    pub fn new_with_base_url(market: MarketType, base_url: impl Into<String>) -> Self {
        Self {
            http: RestClient::new(base_url),
            market,
        }
    }

    fn klines_endpoint(&self) -> &'static str {
        match self.market {
            MarketType::Spot => SPOT_KLINES_ENDPOINT,
            MarketType::Futures => FUTURES_KLINES_ENDPOINT,
        }
    }

    fn exchange_info_endpoint(&self) -> &'static str {
        match self.market {
            MarketType::Spot => SPOT_EXCHANGE_INFO_ENDPOINT,
            MarketType::Futures => FUTURES_EXCHANGE_INFO_ENDPOINT,
        }
    }

    fn page_limit(&self) -> usize {
        match self.market {
            MarketType::Spot => SPOT_PAGE_LIMIT,
            MarketType::Futures => FUTURES_PAGE_LIMIT,
        }
    }
}

#[async_trait]
impl ExchangeFetcher for BinanceFetcher {
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>> {
        let params = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("startTime", since_ms.to_string()),
            ("limit", self.page_limit().to_string()),
        ];

        debug!(symbol, %interval, since_ms, "fetching binance klines page");

        let klines: Vec<Value> = self.http.get(self.klines_endpoint(), &params).await?;
        parse_klines(&klines)
    }

    async fn list_symbols(&self) -> FetcherResult<Vec<String>> {
        let params: Vec<(&str, String)> = vec![];
        let body: Value = self.http.get(self.exchange_info_endpoint(), &params).await?;

        let symbols = body
            .get("symbols")
            .and_then(|v| v.as_array())
            .ok_or_else(|| FetcherError::InvalidResponse("Missing symbols array".to_string()))?;

        Ok(symbols
            .iter()
            .filter_map(|s| s.get("symbol").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect())
    }

    fn provider(&self) -> Provider {
        Provider::Binance
    }
}
