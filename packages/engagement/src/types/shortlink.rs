//! Persisted short-link records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which mechanism produced a short URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkProvider {
    /// The configured external shortening provider.
    Provider,

    /// Deterministic-format link built locally with a random tracking token.
    Fallback,
}

impl std::fmt::Display for LinkProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkProvider::Provider => write!(f, "PROVIDER"),
            LinkProvider::Fallback => write!(f, "FALLBACK"),
        }
    }
}

impl std::str::FromStr for LinkProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PROVIDER" => Ok(LinkProvider::Provider),
            "FALLBACK" => Ok(LinkProvider::Fallback),
            other => Err(format!("unknown link provider: {other}")),
        }
    }
}

/// A stored short link. At most one record exists per
/// `(original_url, campaign_id)` pair; the record is immutable after
/// creation except for `click_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLinkRecord {
    pub id: i64,
    pub original_url: String,
    pub campaign_id: i64,
    pub product_id: Option<i64>,
    pub short_url: String,
    pub provider: LinkProvider,
    pub click_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Fields for a short link about to be persisted.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub original_url: String,
    pub campaign_id: i64,
    pub product_id: Option<i64>,
    pub short_url: String,
    pub provider: LinkProvider,
}
