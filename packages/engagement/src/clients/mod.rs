//! HTTP clients for the campaign and product read models.

pub mod campaign;
pub mod product;

pub use campaign::CampaignClient;
pub use product::ProductClient;

use std::time::Duration;

use crate::error::{EngagementError, Result};

/// Default bound on context lookups. A slow upstream stalls only the
/// worker handling the current partition, never the whole pipeline.
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EngagementError::Config(format!("failed to build HTTP client: {e}")))
}
