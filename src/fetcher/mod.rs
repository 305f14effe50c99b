//! Exchange adapter implementations
//!
//! Each provider module normalizes its venue's raw candle responses into a
//! uniform [`Candle`] sequence. Adapters hold the provider-specific pagination
//! parameters (page size, resolution encoding); they never retry on their own.
//! Transport and parse errors propagate to the downloader, which owns the
//! retry policy.

use crate::config::AppConfig;
use crate::{Candle, Interval, MarketType, Provider};
use async_trait::async_trait;

pub mod binance;
pub mod ftx;
pub mod http;
pub mod oanda;
pub mod parser;

/// Fetcher errors
#[derive(Debug, thiserror::Error)]
pub enum FetcherError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Response parse error
    #[error("parse error: {0}")]
    ParseError(String),

    /// API error response
    #[error("API error: {0}")]
    ApiError(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    NetworkError(String),

    /// Unknown or unsupported provider
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Credentials required for this provider are not configured
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

/// Result type for fetcher operations
pub type FetcherResult<T> = Result<T, FetcherError>;

/// Uniform "fetch candles after time T" capability over a provider's API.
#[async_trait]
pub trait ExchangeFetcher: Send + Sync {
    /// Fetch one page of candles starting at `since_ms`.
    ///
    /// # Arguments
    /// * `symbol` - Trading symbol (e.g., "BTCUSDT", "EUR_USD", "BTC-PERP")
    /// * `interval` - Time interval for candles
    /// * `since_ms` - Cursor (Unix timestamp in milliseconds); only candles at
    ///   or after this instant are returned
    ///
    /// # Returns
    /// A possibly empty, strictly time-increasing page of candles. An empty
    /// page means the series is exhausted up to now.
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        since_ms: i64,
    ) -> FetcherResult<Vec<Candle>>;

    /// List all tradable symbol codes on this provider.
    async fn list_symbols(&self) -> FetcherResult<Vec<String>>;

    /// The provider this fetcher talks to.
    fn provider(&self) -> Provider;
}

/// Create a fetcher for the given provider and market type.
///
/// Provider SDK-style handles are constructed here once and injected into the
/// downloader, keeping the download loop unit-testable against stub fetchers.
///
/// # Errors
/// Returns [`FetcherError::MissingCredentials`] when the provider requires
/// configuration that is absent (OANDA token and account).
pub fn create_fetcher(
    provider: Provider,
    market: MarketType,
    config: &AppConfig,
) -> FetcherResult<Box<dyn ExchangeFetcher>> {
    match provider {
        Provider::Binance => Ok(Box::new(binance::BinanceFetcher::new(market))),
        Provider::Oanda => {
            let token = config.oanda_token.clone().ok_or_else(|| {
                FetcherError::MissingCredentials("OANDA_API_TOKEN not set".to_string())
            })?;
            let account = config.oanda_account.clone().ok_or_else(|| {
                FetcherError::MissingCredentials("OANDA_ACCOUNT_ID not set".to_string())
            })?;
            Ok(Box::new(oanda::OandaFetcher::new(token, account)))
        }
        Provider::Ftx => Ok(Box::new(ftx::FtxFetcher::new())),
    }
}
