//! Per-symbol download job description

use crate::{Interval, MarketType, Provider};
use std::path::{Path, PathBuf};

/// One symbol's download job: the cache-file key plus the initial cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct PairJob {
    /// Trading symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Candle interval
    pub interval: Interval,
    /// Spot or futures market
    pub market: MarketType,
    /// Provider to fetch from
    pub provider: Provider,
    /// Cursor used when no cache exists yet (Unix timestamp in milliseconds)
    pub start_time: i64,
}

impl PairJob {
    /// Create a new job.
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        market: MarketType,
        provider: Provider,
        start_time: i64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            interval,
            market,
            provider,
            start_time,
        }
    }

    /// Cache file path for this job's (symbol, interval, market, provider) key.
    pub fn cache_path(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(format!(
            "{}-{}-{}-{}-data.csv",
            self.symbol, self.interval, self.market, self.provider
        ))
    }
}
