//! CLI surface and run-mode implementations

pub mod error;
pub mod run;

use clap::{Parser, ValueEnum};

pub use error::CliError;

/// Candlestick downloader and binary encoder.
#[derive(Debug, Parser)]
#[command(name = "candle-downloader", version, about)]
pub struct Cli {
    /// What to download or convert
    #[arg(value_enum)]
    pub mode: Mode,
}

/// Run mode. Download modes fetch into the cache and then encode it;
/// `history` and `fx` only encode files already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Binance futures USDT pairs, hourly candles
    #[value(name = "1h")]
    Hourly,
    /// FTX perpetual futures, hourly candles
    #[value(name = "1h-ftx")]
    HourlyFtx,
    /// Binance spot USDT pairs, hourly candles
    #[value(name = "spot")]
    Spot,
    /// Binance spot BTC-quoted pairs, hourly candles
    #[value(name = "btc")]
    Btc,
    /// Binance futures USDT pairs, minute candles
    #[value(name = "1m")]
    Minute,
    /// OANDA instruments, hourly candles
    #[value(name = "oanda")]
    Oanda,
    /// Convert historical exchange dumps already on disk
    #[value(name = "history")]
    History,
    /// Convert FX vendor archives already on disk
    #[value(name = "fx")]
    Fx,
}
