//! Binance kline response parser
//!
//! Binance delivers klines as untyped JSON arrays:
//! `[open_time, open, high, low, close, volume, close_time, ...]` with prices
//! as decimal strings. This module converts them to [`Candle`] values; it is
//! stateless and shared by the spot and futures paths.

use crate::fetcher::{FetcherError, FetcherResult};
use crate::Candle;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Minimum elements needed from a kline array (open_time + OHLC).
const MIN_KLINE_FIELDS: usize = 5;

/// Parse a Binance klines JSON array into candles.
///
/// # Errors
/// Returns [`FetcherError::ParseError`] if an element is not an array, is too
/// short, or a field cannot be parsed.
pub fn parse_klines(klines: &[Value]) -> FetcherResult<Vec<Candle>> {
    let mut candles = Vec::with_capacity(klines.len());

    for kline in klines {
        let arr = kline
            .as_array()
            .ok_or_else(|| FetcherError::ParseError("Kline is not an array".to_string()))?;

        if arr.len() < MIN_KLINE_FIELDS {
            return Err(FetcherError::ParseError(format!(
                "Expected at least {MIN_KLINE_FIELDS} elements in kline, got {}",
                arr.len()
            )));
        }

        let time = arr[0]
            .as_i64()
            .ok_or_else(|| FetcherError::ParseError("Invalid open_time".to_string()))?;

        candles.push(Candle {
            time,
            open: parse_decimal(&arr[1], "open")?,
            high: parse_decimal(&arr[2], "high")?,
            low: parse_decimal(&arr[3], "low")?,
            close: parse_decimal(&arr[4], "close")?,
        });
    }

    Ok(candles)
}

/// Parse a price field that may arrive as a string or a bare number.
fn parse_decimal(value: &Value, field: &str) -> FetcherResult<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s)
            .map_err(|e| FetcherError::ParseError(format!("Invalid {field}: {e}"))),
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .map_err(|e| FetcherError::ParseError(format!("Invalid {field}: {e}"))),
        _ => Err(FetcherError::ParseError(format!(
            "Invalid {field}: expected string or number"
        ))),
    }
}
