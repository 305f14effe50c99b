//! Text-to-binary candle conversion
//!
//! Turns cached CSV candle data (and vendor CSV/ZIP dumps) into the compact
//! binary format consumed by the charting front end. The converter is purely
//! offline: it never talks to an exchange, it only rewrites files already on
//! disk.
//!
//! Input rows vary by source, so conversion is driven by [`ConvertOptions`]:
//! field delimiter, timestamp format, OHLC column positions, header lines to
//! skip, and row order.

pub mod archive;
pub mod binary;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::downloader::PairJob;
use crate::fetcher::ExchangeFetcher;
use crate::symbols::select_symbols;
use crate::{Interval, MarketType, Provider};

use binary::{encode_records, BinaryRecord};

/// Errors raised while converting text data to binary records.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Filesystem read/write failure
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Corrupt or unreadable zip archive
    #[error("Zip error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Archive contained no CSV entry
    #[error("No CSV entry in archive: {path}")]
    EmptyArchive {
        /// Path of the offending archive
        path: PathBuf,
    },

    /// Timestamp field that does not match the configured date format
    #[error("Bad timestamp {value:?} on line {line}")]
    BadTimestamp {
        /// Raw timestamp field
        value: String,
        /// 1-based line number within the input
        line: usize,
    },

    /// Unrecognized date format name in configuration
    #[error("Unknown date format: {0:?}")]
    UnknownDateFormat(String),

    /// Symbol listing failed while selecting caches to convert
    #[error("Fetcher error: {0}")]
    FetcherError(#[from] crate::fetcher::FetcherError),
}

/// Result alias for converter operations.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Millisecond timestamps shorter than 13 digits are legacy values with the
/// trailing zeros truncated. Anything below this bound gets re-padded.
const MS_PAD_THRESHOLD: i64 = 100_000_000_000;
const MS_DIGITS: usize = 13;

/// How the timestamp field of an input row is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// Epoch milliseconds (legacy truncated values are zero-padded)
    Ms,
    /// `YYYYMMDD?HHMMSS` local wall-clock time, one separator byte at index 8
    DateTime,
    /// Epoch seconds
    Seconds,
    /// Either float seconds (contains '.') or epoch milliseconds
    Half,
}

impl FromStr for DateFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ms" => Ok(DateFormat::Ms),
            "datetime" => Ok(DateFormat::DateTime),
            "s" => Ok(DateFormat::Seconds),
            "half" => Ok(DateFormat::Half),
            other => Err(ConvertError::UnknownDateFormat(other.to_string())),
        }
    }
}

/// Per-source conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Field delimiter byte
    pub delimiter: u8,
    /// Timestamp encoding of column 0
    pub date_format: DateFormat,
    /// Positions of the open, high, low, close columns
    pub ohlc_columns: [usize; 4],
    /// Header lines to drop from the top of the file
    pub skip_lines: usize,
    /// Input rows are newest-first and must be reversed before encoding
    pub reverse: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_format: DateFormat::Ms,
            ohlc_columns: [1, 2, 3, 4],
            skip_lines: 1,
            reverse: false,
        }
    }
}

/// Parse one timestamp field into whole epoch seconds.
pub fn parse_timestamp(value: &str, format: DateFormat, line: usize) -> ConvertResult<i32> {
    let bad = || ConvertError::BadTimestamp {
        value: value.to_string(),
        line,
    };

    let seconds: i64 = match format {
        DateFormat::Ms => {
            let raw: i64 = value.trim().parse().map_err(|_| bad())?;
            let ms = if raw >= 0 && raw < MS_PAD_THRESHOLD {
                let padded = format!("{:0<width$}", value.trim(), width = MS_DIGITS);
                padded.parse().map_err(|_| bad())?
            } else {
                raw
            };
            ms / 1000
        }
        DateFormat::DateTime => parse_local_datetime(value.trim()).ok_or_else(bad)?,
        DateFormat::Seconds => value.trim().parse().map_err(|_| bad())?,
        DateFormat::Half => {
            let trimmed = value.trim();
            if trimmed.contains('.') {
                let float: f64 = trimmed.parse().map_err(|_| bad())?;
                float.floor() as i64
            } else {
                let ms: i64 = trimmed.parse().map_err(|_| bad())?;
                ms / 1000
            }
        }
    };

    i32::try_from(seconds).map_err(|_| bad())
}

/// `YYYYMMDD?HHMMSS` with a single separator byte at index 8, read as local
/// wall-clock time. Returns epoch seconds, or None on any malformed field.
fn parse_local_datetime(value: &str) -> Option<i64> {
    if value.len() < 15 {
        return None;
    }
    let year: i32 = value.get(0..4)?.parse().ok()?;
    let month: u32 = value.get(4..6)?.parse().ok()?;
    let day: u32 = value.get(6..8)?.parse().ok()?;
    let hour: u32 = value.get(9..11)?.parse().ok()?;
    let minute: u32 = value.get(11..13)?.parse().ok()?;
    let second: u32 = value.get(13..15)?.parse().ok()?;

    let naive: NaiveDateTime = NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, second)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Convert raw text rows into binary records.
///
/// Empty lines are dropped, `skip_lines` header rows are skipped, and rows
/// repeating the previous row's timestamp are discarded (exchange dumps
/// occasionally duplicate the boundary candle of adjacent pages). Malformed
/// or missing OHLC fields are encoded as NaN so one bad price does not lose
/// the file; a malformed timestamp aborts the conversion because record
/// order depends on it.
pub fn convert_text(input: &str, options: &ConvertOptions) -> ConvertResult<Vec<BinaryRecord>> {
    // Line numbers are assigned before filtering so errors point at the
    // source file, not at a position in the retained subset.
    let mut lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty())
        .skip(options.skip_lines)
        .collect();
    if options.reverse {
        lines.reverse();
    }

    let delimiter = options.delimiter as char;

    let mut records = Vec::with_capacity(lines.len());
    let mut last_time: Option<i32> = None;

    for (line_number, line) in lines {
        let fields: Vec<&str> = line.split(delimiter).collect();

        let time_s = parse_timestamp(fields[0], options.date_format, line_number)?;
        if last_time == Some(time_s) {
            debug!(time_s, line = line_number, "skipping duplicate timestamp");
            continue;
        }
        last_time = Some(time_s);

        // A column past the end of a short row encodes as NaN, same as a
        // malformed price.
        let price = |column: usize| fields.get(column).map_or(f32::NAN, |f| parse_price(f));
        let [o, h, l, c] = options.ohlc_columns;
        records.push(BinaryRecord {
            time_s,
            open: price(o),
            high: price(h),
            low: price(l),
            close: price(c),
        });
    }

    Ok(records)
}

fn parse_price(field: &str) -> f32 {
    field.trim().parse::<f32>().unwrap_or(f32::NAN)
}

/// Mirror `input` under `output_root` with the extension replaced by `.bin`.
pub fn derive_output_path(input: &Path, output_root: &Path) -> PathBuf {
    let relative = input
        .file_name()
        .map(Path::new)
        .unwrap_or(input)
        .with_extension("bin");
    output_root.join(relative)
}

/// Convert a single CSV or ZIP file into a `.bin` file under `output_root`.
///
/// Returns the path of the written binary file.
pub fn convert_file(
    input: &Path,
    output_root: &Path,
    options: &ConvertOptions,
) -> ConvertResult<PathBuf> {
    let is_zip = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    let contents = if is_zip {
        archive::read_zipped_csv(input)?
    } else {
        fs::read_to_string(input)?
    };

    let records = convert_text(&contents, options)?;
    let output = derive_output_path(input, output_root);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, encode_records(&records))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        records = records.len(),
        "converted"
    );
    Ok(output)
}

/// Convert every existing cache file for the selected symbols.
///
/// Symbols with no cache file yet are skipped, not treated as errors; the
/// download step may simply not have reached them.
pub async fn convert_cached(
    fetcher: &dyn ExchangeFetcher,
    config: &AppConfig,
    interval: Interval,
    quote_suffix: Option<&str>,
    market: MarketType,
    provider: Provider,
) -> ConvertResult<()> {
    let symbols = select_symbols(fetcher, quote_suffix, config.allow_list.as_deref()).await?;
    let options = ConvertOptions::default();

    for symbol in symbols {
        let job = PairJob {
            symbol: symbol.clone(),
            interval,
            market,
            provider,
            start_time: 0,
        };
        let cache_path = job.cache_path(&config.cache_dir);
        if !cache_path.exists() {
            debug!(symbol = %symbol, "no cache file, skipping conversion");
            continue;
        }
        convert_file(&cache_path, &config.output_dir, &options)?;
    }
    Ok(())
}

/// Convert a tree of FX vendor archives (semicolon-delimited, local
/// wall-clock timestamps) into binary files under `output_root`.
pub fn convert_fx_tree(fx_dir: &Path, output_root: &Path) -> ConvertResult<()> {
    let options = ConvertOptions {
        delimiter: b';',
        date_format: DateFormat::DateTime,
        ..ConvertOptions::default()
    };
    convert_tree(fx_dir, output_root, &options)
}

/// Convert historical exchange dumps (newest-first rows, OHLC in columns
/// 3 through 6) for the fixed set of majors.
///
/// Accepts either layout: the flat single-file form
/// `{pair}-1h-historical-data.csv` directly under `history_dir`, or a
/// `{pair}/` subdirectory tree of CSV/ZIP files.
pub fn convert_historical(history_dir: &Path, output_root: &Path) -> ConvertResult<()> {
    let options = ConvertOptions {
        ohlc_columns: [3, 4, 5, 6],
        reverse: true,
        ..ConvertOptions::default()
    };
    for pair in ["BTCUSDT", "ETHUSDT"] {
        let flat_file = history_dir.join(format!("{pair}-1h-historical-data.csv"));
        let pair_dir = history_dir.join(pair);

        if flat_file.is_file() {
            convert_file(&flat_file, output_root, &options)?;
        }
        if pair_dir.is_dir() {
            convert_tree(&pair_dir, &output_root.join(pair), &options)?;
        }
        if !flat_file.is_file() && !pair_dir.is_dir() {
            warn!(pair, dir = %history_dir.display(), "no historical data for pair");
        }
    }
    Ok(())
}

/// Walk `input_root` and convert every CSV or ZIP file found, preserving the
/// relative directory layout under `output_root`.
fn convert_tree(input_root: &Path, output_root: &Path, options: &ConvertOptions) -> ConvertResult<()> {
    let mut converted = 0usize;
    let mut stack = vec![input_root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let is_candidate = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("zip"))
                .unwrap_or(false);
            if !is_candidate {
                continue;
            }
            let relative_dir = path
                .parent()
                .and_then(|p| p.strip_prefix(input_root).ok())
                .unwrap_or_else(|| Path::new(""));
            convert_file(&path, &output_root.join(relative_dir), options)?;
            converted += 1;
        }
    }
    info!(root = %input_root.display(), converted, "tree conversion complete");
    Ok(())
}
