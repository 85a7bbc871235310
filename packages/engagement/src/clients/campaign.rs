//! Campaign service client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::{build_http_client, DEFAULT_TIMEOUT};
use crate::error::{EngagementError, Result};
use crate::traits::CampaignSource;
use crate::types::CampaignContext;

/// Read-only client for the campaign service.
pub struct CampaignClient {
    http: reqwest::Client,
    base_url: String,
}

impl CampaignClient {
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
impl CampaignSource for CampaignClient {
    async fn campaign(&self, id: i64) -> Result<Option<CampaignContext>> {
        let url = format!("{}/api/campaigns/{}", self.base_url, id);
        debug!(campaign_id = id, %url, "fetching campaign");

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

        let campaign = response
            .json::<CampaignContext>()
            .await
            .map_err(|e| EngagementError::Context(e.into()))?;

        Ok(Some(campaign))
    }
}
