//! CLI error types and conversions

use crate::convert::ConvertError;
use crate::downloader::DownloadError;
use crate::fetcher::FetcherError;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Fetcher error
    #[error("fetcher error: {0}")]
    FetcherError(#[from] FetcherError),

    /// Download error
    #[error("download error: {0}")]
    DownloadError(#[from] DownloadError),

    /// Conversion error
    #[error("conversion error: {0}")]
    ConvertError(#[from] ConvertError),
}
