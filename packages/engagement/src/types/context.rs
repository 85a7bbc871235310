//! Campaign and product read models fetched from the upstream services.

use serde::{Deserialize, Serialize};

/// How replies for a campaign are released once generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignMode {
    /// Approved automatically, posted without review.
    Auto,

    /// Held for human review before posting.
    #[default]
    SemiAuto,
}

impl std::fmt::Display for CampaignMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignMode::Auto => write!(f, "AUTO"),
            CampaignMode::SemiAuto => write!(f, "SEMI_AUTO"),
        }
    }
}

impl std::str::FromStr for CampaignMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AUTO" => Ok(CampaignMode::Auto),
            "SEMI_AUTO" => Ok(CampaignMode::SemiAuto),
            other => Err(format!("unknown campaign mode: {other}")),
        }
    }
}

/// Campaign metadata, fetched per event and never cached across events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignContext {
    pub id: i64,
    pub name: String,
    pub product_id: i64,
    pub status: String,
    /// Upstream records created before mode existed omit it; callers fall
    /// back to [`CampaignMode::SemiAuto`].
    #[serde(default)]
    pub mode: Option<CampaignMode>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Product metadata for the campaign's target product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductContext {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub product_url: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}
