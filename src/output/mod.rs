//! Cache file output
//!
//! The CSV cache file is the durable source of truth for a downloaded series.
//! It is created once, appended on resume, and never rewritten once it holds
//! data; the converter derives the binary artifact from it.

pub mod cache;

pub use cache::{CandleCache, WriteMode};

/// Output writer errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// CSV write error
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Existing cache whose last line is not a candle row
    #[error("corrupt cache {path}: unparseable last line {line:?}")]
    CorruptCache {
        /// Path of the damaged cache file
        path: String,
        /// The unparseable line
        line: String,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
