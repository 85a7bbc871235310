//! Product service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{build_http_client, DEFAULT_TIMEOUT};
use crate::error::{EngagementError, Result};
use crate::traits::ProductSource;
use crate::types::ProductContext;

/// Read-only client for the product service.
pub struct ProductClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProductClient {
    /// Create a client for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_http_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ProductSource for ProductClient {
    async fn product(&self, id: i64) -> Result<Option<ProductContext>> {
        let url = format!("{}/api/products/{}", self.base_url, id);
        debug!(product_id = id, %url, "fetching product");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| EngagementError::Context(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = response
            .error_for_status()
            .map_err(|e| EngagementError::Context(e.into()))?;

        let product = response
            .json::<ProductContext>()
            .await
            .map_err(|e| EngagementError::Context(e.into()))?;

        Ok(Some(product))
    }
}
