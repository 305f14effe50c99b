//! Append-only CSV cache files
//!
//! One cache file per (symbol, interval, market-type, provider) key. The
//! header row `timestamp,open,high,low,close` exists only when the file is
//! freshly created; resumed runs append rows with no re-written header. The
//! last row's leading timestamp is the authoritative resume point.

use crate::Candle;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{OutputError, OutputResult};

/// Header written exactly once, at file creation.
const HEADER: [&str; 5] = ["timestamp", "open", "high", "low", "close"];

/// How many bytes to read from the end of the file when locating the last
/// line. Far larger than any row the cache writes.
const TAIL_READ_BYTES: u64 = 8192;

/// Whether a run creates the cache file or extends an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fresh file: header plus rows, truncating anything present.
    Create,
    /// Existing file: rows only, appended at the end.
    Append,
}

/// A candle cache file at a fixed path.
pub struct CandleCache {
    path: PathBuf,
}

impl CandleCache {
    /// Bind to a cache file path (the file need not exist yet).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The underlying file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the resume point: the leading timestamp field of the last
    /// non-empty line.
    ///
    /// Returns `Ok(None)` when the file does not exist, is empty, or holds
    /// only the header row, in which case the caller starts a fresh download.
    /// A last line that is neither the header nor a parseable candle row is
    /// [`OutputError::CorruptCache`]: the file holds history that must not be
    /// truncated by a fresh-download write.
    pub fn last_timestamp(&self) -> OutputResult<Option<i64>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut file = File::open(&self.path)
            .map_err(|e| OutputError::IoError(format!("Failed to open cache: {e}")))?;
        let len = file
            .metadata()
            .map_err(|e| OutputError::IoError(e.to_string()))?
            .len();

        // Only the tail is needed to find the last line.
        let offset = len.saturating_sub(TAIL_READ_BYTES);
        file.seek(SeekFrom::Start(offset))
            .map_err(|e| OutputError::IoError(e.to_string()))?;

        let mut tail = String::new();
        file.read_to_string(&mut tail)
            .map_err(|e| OutputError::IoError(format!("Failed to read cache tail: {e}")))?;

        let last_line = match tail.lines().rev().find(|line| !line.trim().is_empty()) {
            Some(line) => line,
            None => return Ok(None),
        };

        let leading_field = last_line.split(',').next().unwrap_or("").trim();
        match leading_field.parse::<i64>() {
            Ok(timestamp) => Ok(Some(timestamp)),
            Err(_) if leading_field == HEADER[0] => Ok(None),
            Err(_) => Err(OutputError::CorruptCache {
                path: self.path.display().to_string(),
                line: last_line.to_string(),
            }),
        }
    }

    /// Write candles to the cache.
    ///
    /// In [`WriteMode::Create`] the file is (re)written with the header row;
    /// in [`WriteMode::Append`] rows are appended and an empty candle slice is
    /// a no-op, leaving the file byte-identical.
    pub fn write(&self, candles: &[Candle], mode: WriteMode) -> OutputResult<()> {
        if mode == WriteMode::Append && candles.is_empty() {
            debug!(path = %self.path.display(), "no new candles, cache untouched");
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("Failed to create directory: {e}")))?;
        }

        let file = match mode {
            WriteMode::Create => File::create(&self.path),
            WriteMode::Append => OpenOptions::new().append(true).open(&self.path),
        }
        .map_err(|e| OutputError::IoError(format!("Failed to open cache for writing: {e}")))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        if mode == WriteMode::Create {
            writer
                .write_record(HEADER)
                .map_err(|e| OutputError::CsvError(format!("Failed to write header: {e}")))?;
        }

        for candle in candles {
            writer
                .write_record([
                    candle.time.to_string(),
                    candle.open.to_string(),
                    candle.high.to_string(),
                    candle.low.to_string(),
                    candle.close.to_string(),
                ])
                .map_err(|e| OutputError::CsvError(format!("Failed to write row: {e}")))?;
        }

        writer
            .flush()
            .map_err(|e| OutputError::IoError(format!("Failed to flush cache: {e}")))?;

        info!(
            path = %self.path.display(),
            rows = candles.len(),
            mode = ?mode,
            "cache written"
        );
        Ok(())
    }
}
