//! Reply suggestion event payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::CampaignMode;

/// A synthesized reply, published to `replies.suggested.{post_id}` by the
/// ingestion stage and consumed once by the persistence stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplySuggestion {
    /// Source post this reply answers. Also the dedup key for tasks.
    pub post_id: String,

    pub campaign_id: i64,
    pub reply_text: String,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_link: Option<String>,

    // Original post context, carried for audit
    pub post_author: String,
    pub post_text: String,
    pub post_url: String,

    pub mode: CampaignMode,

    // Content safety analysis
    pub is_risky: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_reason: Option<String>,

    pub created_at: DateTime<Utc>,
}
