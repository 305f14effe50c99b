//! Shared HTTP helper for provider REST APIs
//!
//! A thin request-and-deserialize wrapper around [`reqwest::Client`]. It does
//! NOT retry: the downloader owns the retry policy, so every transport or
//! parse failure surfaces immediately as a [`FetcherError`].

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::fetcher::{FetcherError, FetcherResult};

/// Thin REST client bound to one provider's base URL.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl RestClient {
    /// Create a new client for `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token sent with every request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// The base URL this client is bound to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute a GET request and deserialize the JSON response.
    ///
    /// # Arguments
    /// * `endpoint` - API endpoint path (e.g., "/fapi/v1/klines")
    /// * `params` - Query parameters as key-value pairs
    pub async fn get<T>(&self, endpoint: &str, params: &[(&str, String)]) -> FetcherResult<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {} with {} params", url, params.len());

        let mut request = self.client.get(&url).query(params);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetcherError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(FetcherError::HttpError(format!("{status}: {body}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetcherError::ParseError(format!("Failed to deserialize response: {e}")))
    }
}
