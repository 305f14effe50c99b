//! Runtime configuration
//!
//! All settings come from the environment so the binary can run unattended
//! from cron or a container without flags beyond the mode. Every directory
//! has a sensible relative default; credentials default to absent and are
//! only required by the providers that need them.

use std::env;
use std::path::PathBuf;

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory for append-only CSV candle caches
    pub cache_dir: PathBuf,
    /// Directory for encoded binary output
    pub output_dir: PathBuf,
    /// Root of the FX vendor archive tree
    pub fx_dir: PathBuf,
    /// Root of the historical dump tree
    pub history_dir: PathBuf,
    /// Optional symbol allow list, restricting every run mode
    pub allow_list: Option<Vec<String>>,
    /// OANDA API bearer token
    pub oanda_token: Option<String>,
    /// OANDA account id, used for instrument listing
    pub oanda_account: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
            output_dir: PathBuf::from("data"),
            fx_dir: PathBuf::from("fx"),
            history_dir: PathBuf::from("history"),
            allow_list: None,
            oanda_token: None,
            oanda_account: None,
        }
    }
}

impl AppConfig {
    /// Build configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// - `CACHE_DIR`, `OUTPUT_DIR`, `FX_DIR`, `HISTORY_DIR` override the
    ///   data directories.
    /// - `FILTER` is a comma-separated symbol allow list.
    /// - `OANDA_API_TOKEN` and `OANDA_ACCOUNT_ID` enable the OANDA provider.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_dir: env_path("CACHE_DIR").unwrap_or(defaults.cache_dir),
            output_dir: env_path("OUTPUT_DIR").unwrap_or(defaults.output_dir),
            fx_dir: env_path("FX_DIR").unwrap_or(defaults.fx_dir),
            history_dir: env_path("HISTORY_DIR").unwrap_or(defaults.history_dir),
            allow_list: env_nonempty("FILTER").map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            }),
            oanda_token: env_nonempty("OANDA_API_TOKEN"),
            oanda_account: env_nonempty("OANDA_ACCOUNT_ID"),
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_nonempty(key).map(PathBuf::from)
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
