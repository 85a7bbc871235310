//! Bitly implementation of the [`LinkShortener`] trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::ShortenError;
use crate::traits::LinkShortener;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bitly v4 shortening client.
pub struct BitlyShortener {
    client: Client,
    token: String,
    api_url: String,
    timeout: Duration,
}

impl BitlyShortener {
    /// Create a client with the given access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            api_url: "https://api-ssl.bitly.com/v4/shorten".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom API URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the request timeout (default: 10s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ShortenRequest<'a> {
    long_url: &'a str,
}

#[derive(Deserialize)]
struct ShortenResponse {
    link: Option<String>,
}

#[async_trait]
impl LinkShortener for BitlyShortener {
    async fn shorten(&self, long_url: &str) -> Result<String, ShortenError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.token))
            .timeout(self.timeout)
            .json(&ShortenRequest { long_url })
            .send()
            .await
            .map_err(|e| ShortenError::Http(e.into()))?
            .error_for_status()
            .map_err(|e| ShortenError::Http(e.into()))?;

        let body: ShortenResponse = response
            .json()
            .await
            .map_err(|e| ShortenError::Http(e.into()))?;

        body.link
            .filter(|link| !link.is_empty())
            .ok_or_else(|| ShortenError::BadResponse("missing link field".into()))
    }
}
