//! Dictionary lookup - "is this a real word?" validation.
//!
//! [`DictionaryLookup`] distinguishes three outcomes: found, not found, and
//! transport failure. The resolver treats transport failure as "valid"
//! (fail open) so connectivity problems never block the learner; that policy
//! lives in the resolver, not here.

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DictionaryError
// ---------------------------------------------------------------------------

/// Transport-level failures while consulting the dictionary service.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// HTTP transport or connection error.
    #[error("dictionary request failed: {0}")]
    Request(String),

    /// The request did not complete within the client timeout.
    #[error("dictionary request timed out")]
    Timeout,
}

impl From<reqwest::Error> for DictionaryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DictionaryError::Timeout
        } else {
            DictionaryError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// DictionaryLookup trait
// ---------------------------------------------------------------------------

/// Async trait for dictionary backends.
#[async_trait]
pub trait DictionaryLookup: Send + Sync {
    /// Returns `Ok(true)` when `word` is a recognised dictionary word,
    /// `Ok(false)` when the service answered "not found", and `Err` only on
    /// transport failure.
    async fn lookup(&self, word: &str) -> Result<bool, DictionaryError>;
}

// ---------------------------------------------------------------------------
// DictionaryApiLookup
// ---------------------------------------------------------------------------

/// Production lookup against the free dictionaryapi.dev service.
///
/// A successful status means the entry exists; 404 (or any other status)
/// means it does not. Only transport failures surface as `Err`.
pub struct DictionaryApiLookup {
    client: reqwest::Client,
    base_url: String,
}

impl DictionaryApiLookup {
    const DEFAULT_BASE_URL: &'static str = "https://api.dictionaryapi.dev";

    pub fn new() -> Self {
        Self::with_base_url(Self::DEFAULT_BASE_URL.into())
    }

    /// Point the lookup at a different endpoint (useful for tests).
    pub fn with_base_url(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, base_url }
    }
}

impl Default for DictionaryApiLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DictionaryLookup for DictionaryApiLookup {
    async fn lookup(&self, word: &str) -> Result<bool, DictionaryError> {
        let url = format!("{}/api/v2/entries/en/{}", self.base_url, word);
        let response = self.client.get(&url).send().await?;
        Ok(response.status().is_success())
    }
}
