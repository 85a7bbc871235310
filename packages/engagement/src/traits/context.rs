//! Read-only accessors for campaign and product metadata.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CampaignContext, ProductContext};

/// Campaign lookup by id.
///
/// `Ok(None)` means the campaign does not exist (a removed or inactive
/// campaign is a valid outcome, not a failure). `Err` means the lookup
/// itself failed and the event should be quarantined.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    async fn campaign(&self, id: i64) -> Result<Option<CampaignContext>>;
}

/// Product lookup by id, with the same absence semantics as
/// [`CampaignSource`].
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn product(&self, id: i64) -> Result<Option<ProductContext>>;
}
