//! # Candle Downloader Library
//!
//! A library for acquiring historical OHLC candlestick series from multiple
//! market-data providers, persisting them incrementally as CSV caches, and
//! compacting them into a fixed-width binary format for a visualization
//! front end.
//!
//! ## Features
//!
//! - **Multi-Provider Support**: Binance (spot and futures), OANDA, and
//!   FTX-style venues behind one fetcher trait
//! - **Resumable Downloads**: the last cached row is the resume cursor, so an
//!   interrupted backfill continues where it stopped
//! - **Batch Capping**: long backfills are chunked at 50,000 candles per run
//! - **Binary Compaction**: CSV caches compile into 20-byte little-endian
//!   records consumed by the charting front end
//!
//! ## Quick Start
//!
//! ```no_run
//! use candle_downloader::config::AppConfig;
//! use candle_downloader::downloader::{Downloader, PairJob};
//! use candle_downloader::fetcher::create_fetcher;
//! use candle_downloader::{Interval, MarketType, Provider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::from_env();
//! let fetcher = create_fetcher(Provider::Binance, MarketType::Futures, &config)?;
//! let downloader = Downloader::new(fetcher.as_ref(), &config.cache_dir);
//!
//! let job = PairJob::new(
//!     "BTCUSDT",
//!     Interval::OneHour,
//!     MarketType::Futures,
//!     Provider::Binance,
//!     1483228800000, // 2017-01-01 00:00:00 UTC
//! );
//!
//! // Loop while the downloader reports more data beyond the batch cap.
//! while downloader.download_pair(&job).await? {}
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`fetcher`] - Exchange adapters normalizing provider responses to [`Candle`]
//! - [`downloader`] - Resumable, batch-capped download loop
//! - [`symbols`] - Tradable symbol discovery and filtering
//! - [`output`] - Append-only CSV cache files
//! - [`convert`] - Text-to-binary compaction
//! - [`config`] - Environment-driven configuration
//! - [`cli`] - Run-mode dispatch

#![warn(missing_docs)]
#![warn(clippy::all)]

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Run-mode command implementations
pub mod cli;

/// Environment-driven configuration
pub mod config;

/// Text-to-binary compaction
pub mod convert;

/// Resumable download orchestration
pub mod downloader;

/// Exchange adapters
pub mod fetcher;

/// Cache file output
pub mod output;

/// Symbol discovery and filtering
pub mod symbols;

/// A single OHLC candlestick.
///
/// `time` is always normalized to Unix epoch milliseconds regardless of the
/// provider's native unit. Within one fetch response, `time` values are
/// strictly increasing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    /// Open time (Unix timestamp in milliseconds)
    pub time: i64,
    /// Open price
    pub open: Decimal,
    /// High price
    pub high: Decimal,
    /// Low price
    pub low: Decimal,
    /// Close price
    pub close: Decimal,
}

/// Time interval for candles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    /// 1 minute
    #[serde(rename = "1m")]
    OneMinute,
    /// 5 minutes
    #[serde(rename = "5m")]
    FiveMinutes,
    /// 15 minutes
    #[serde(rename = "15m")]
    FifteenMinutes,
    /// 30 minutes
    #[serde(rename = "30m")]
    ThirtyMinutes,
    /// 1 hour
    #[serde(rename = "1h")]
    OneHour,
    /// 4 hours
    #[serde(rename = "4h")]
    FourHours,
    /// 1 day
    #[serde(rename = "1d")]
    OneDay,
    /// 1 week
    #[serde(rename = "1w")]
    OneWeek,
}

impl Interval {
    /// Convert interval to milliseconds
    pub fn to_milliseconds(&self) -> i64 {
        match self {
            Interval::OneMinute => 60_000,
            Interval::FiveMinutes => 300_000,
            Interval::FifteenMinutes => 900_000,
            Interval::ThirtyMinutes => 1_800_000,
            Interval::OneHour => 3_600_000,
            Interval::FourHours => 14_400_000,
            Interval::OneDay => 86_400_000,
            Interval::OneWeek => 604_800_000,
        }
    }

    /// Convert interval to whole seconds (FTX-style resolution encoding)
    pub fn resolution_seconds(&self) -> i64 {
        self.to_milliseconds() / 1000
    }

    /// OANDA granularity code: unit letter uppercased, number appended
    /// ("1h" becomes "H1", "15m" becomes "M15").
    pub fn oanda_granularity(&self) -> &'static str {
        match self {
            Interval::OneMinute => "M1",
            Interval::FiveMinutes => "M5",
            Interval::FifteenMinutes => "M15",
            Interval::ThirtyMinutes => "M30",
            Interval::OneHour => "H1",
            Interval::FourHours => "H4",
            Interval::OneDay => "D1",
            Interval::OneWeek => "W1",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Interval::OneMinute => "1m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
            Interval::OneWeek => "1w",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::OneMinute),
            "5m" => Ok(Interval::FiveMinutes),
            "15m" => Ok(Interval::FifteenMinutes),
            "30m" => Ok(Interval::ThirtyMinutes),
            "1h" => Ok(Interval::OneHour),
            "4h" => Ok(Interval::FourHours),
            "1d" => Ok(Interval::OneDay),
            "1w" => Ok(Interval::OneWeek),
            _ => Err(format!("Invalid interval: {s}")),
        }
    }
}

/// Market-data provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// Binance spot / futures REST API
    #[serde(rename = "binance")]
    Binance,
    /// OANDA v3 REST API
    #[serde(rename = "oanda")]
    Oanda,
    /// FTX-style venue REST API
    #[serde(rename = "ftx")]
    Ftx,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Provider::Binance => "binance",
            Provider::Oanda => "oanda",
            Provider::Ftx => "ftx",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binance" => Ok(Provider::Binance),
            "oanda" => Ok(Provider::Oanda),
            "ftx" => Ok(Provider::Ftx),
            _ => Err(format!("Unknown provider: {s}")),
        }
    }
}

/// Market type for a download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarketType {
    /// Spot market
    #[serde(rename = "spot")]
    Spot,
    /// Futures / perpetual market
    #[serde(rename = "futures")]
    Futures,
}

impl std::fmt::Display for MarketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MarketType::Spot => "spot",
            MarketType::Futures => "futures",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MarketType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spot" => Ok(MarketType::Spot),
            "futures" => Ok(MarketType::Futures),
            _ => Err(format!("Unknown market type: {s}")),
        }
    }
}
