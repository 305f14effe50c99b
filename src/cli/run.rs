//! Mode dispatch
//!
//! Each download mode is a fixed tuple of provider, market, interval, quote
//! filter, and start date. The pipeline per mode is: select symbols, drain
//! each symbol's pagination until caught up, then encode the caches.

use chrono::{TimeZone, Utc};
use tracing::{error, info};

use crate::cli::{CliError, Mode};
use crate::config::AppConfig;
use crate::convert::{convert_cached, convert_fx_tree, convert_historical};
use crate::downloader::{Downloader, PairJob};
use crate::fetcher::create_fetcher;
use crate::symbols::select_symbols;
use crate::{Interval, MarketType, Provider};

/// Execute one run mode to completion.
pub async fn run(mode: Mode, config: &AppConfig) -> Result<(), CliError> {
    match mode {
        Mode::Hourly => {
            download_and_convert(
                config,
                Provider::Binance,
                MarketType::Futures,
                Interval::OneHour,
                Some("USDT"),
                start_of_day_ms(2017, 1, 1),
            )
            .await
        }
        Mode::HourlyFtx => {
            download_and_convert(
                config,
                Provider::Ftx,
                MarketType::Futures,
                Interval::OneHour,
                None,
                start_of_day_ms(2017, 1, 1),
            )
            .await
        }
        Mode::Spot => {
            download_and_convert(
                config,
                Provider::Binance,
                MarketType::Spot,
                Interval::OneHour,
                Some("USDT"),
                start_of_day_ms(2017, 1, 1),
            )
            .await
        }
        Mode::Btc => {
            download_and_convert(
                config,
                Provider::Binance,
                MarketType::Spot,
                Interval::OneHour,
                Some("BTC"),
                start_of_day_ms(2017, 1, 1),
            )
            .await
        }
        Mode::Minute => {
            download_and_convert(
                config,
                Provider::Binance,
                MarketType::Futures,
                Interval::OneMinute,
                Some("USDT"),
                start_of_day_ms(2021, 5, 20),
            )
            .await
        }
        Mode::Oanda => {
            download_and_convert(
                config,
                Provider::Oanda,
                MarketType::Futures,
                Interval::OneHour,
                None,
                start_of_day_ms(2000, 1, 1),
            )
            .await
        }
        Mode::History => {
            convert_historical(&config.history_dir, &config.output_dir)?;
            Ok(())
        }
        Mode::Fx => {
            convert_fx_tree(&config.fx_dir, &config.output_dir)?;
            Ok(())
        }
    }
}

/// Download every selected symbol, then encode the caches.
///
/// A symbol that keeps failing is logged and skipped so one broken market
/// cannot stall the whole batch. Its cache keeps whatever pages landed
/// before the failure and the next run resumes from there.
async fn download_and_convert(
    config: &AppConfig,
    provider: Provider,
    market: MarketType,
    interval: Interval,
    quote_suffix: Option<&str>,
    start_time: i64,
) -> Result<(), CliError> {
    let fetcher = create_fetcher(provider, market, config)?;
    let symbols =
        select_symbols(fetcher.as_ref(), quote_suffix, config.allow_list.as_deref()).await?;
    let downloader = Downloader::new(fetcher.as_ref(), &config.cache_dir);

    let mut failed = 0usize;
    for symbol in &symbols {
        let job = PairJob {
            symbol: symbol.clone(),
            interval,
            market,
            provider,
            start_time,
        };
        loop {
            match downloader.download_pair(&job).await {
                Ok(true) => continue,
                Ok(false) => break,
                Err(err) => {
                    error!(symbol = %symbol, error = %err, "skipping symbol after download failure");
                    failed += 1;
                    break;
                }
            }
        }
    }
    info!(
        total = symbols.len(),
        failed,
        provider = %provider,
        "download batch complete"
    );

    convert_cached(
        fetcher.as_ref(),
        config,
        interval,
        quote_suffix,
        market,
        provider,
    )
    .await?;
    Ok(())
}

/// Midnight UTC of the given date as epoch milliseconds.
fn start_of_day_ms(year: i32, month: u32, day: u32) -> i64 {
    // The dates are fixed mode constants, always valid.
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}
