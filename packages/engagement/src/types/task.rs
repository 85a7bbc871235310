//! Reviewable task entity and its status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::context::CampaignMode;
use super::suggestion::ReplySuggestion;

/// Review status of a task.
///
/// Tasks are created as `Pending` by the persistence stage. Later
/// transitions are driven by operators or automation through the task
/// command surface; `Posted` and `Rejected` are terminal. Transition
/// legality is the calling layer's policy, not the store's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Approved,
    Rejected,
    Posted,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "PENDING"),
            TaskStatus::Approved => write!(f, "APPROVED"),
            TaskStatus::Rejected => write!(f, "REJECTED"),
            TaskStatus::Posted => write!(f, "POSTED"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TaskStatus::Pending),
            "APPROVED" => Ok(TaskStatus::Approved),
            "REJECTED" => Ok(TaskStatus::Rejected),
            "POSTED" => Ok(TaskStatus::Posted),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}

/// The durable unit of work: one reviewable reply per source post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,

    /// Unique per task; enforces idempotent ingestion under redelivery.
    pub post_id: String,

    pub campaign_id: i64,
    pub reply_text: String,
    pub mode: CampaignMode,
    pub status: TaskStatus,

    // Audit copy of the suggestion
    pub post_author: Option<String>,
    pub post_text: Option<String>,
    pub post_url: Option<String>,
    pub confidence: Option<f64>,
    pub short_link: Option<String>,
    pub is_risky: Option<bool>,
    pub risk_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a task about to be created.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub post_id: String,
    pub campaign_id: i64,
    pub reply_text: String,
    pub mode: CampaignMode,
    pub post_author: Option<String>,
    pub post_text: Option<String>,
    pub post_url: Option<String>,
    pub confidence: Option<f64>,
    pub short_link: Option<String>,
    pub is_risky: Option<bool>,
    pub risk_reason: Option<String>,
}

impl From<&ReplySuggestion> for NewTask {
    fn from(suggestion: &ReplySuggestion) -> Self {
        Self {
            post_id: suggestion.post_id.clone(),
            campaign_id: suggestion.campaign_id,
            reply_text: suggestion.reply_text.clone(),
            mode: suggestion.mode,
            post_author: Some(suggestion.post_author.clone()),
            post_text: Some(suggestion.post_text.clone()),
            post_url: Some(suggestion.post_url.clone()),
            confidence: Some(suggestion.confidence),
            short_link: suggestion.short_link.clone(),
            is_risky: Some(suggestion.is_risky),
            risk_reason: suggestion.risk_reason.clone(),
        }
    }
}

/// Aggregate task counts for operational reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub posted: i64,
    /// Tasks flagged risky by the safety analysis, across all statuses.
    pub risky: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::Approved,
            TaskStatus::Rejected,
            TaskStatus::Posted,
        ] {
            let parsed: TaskStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("SHIPPED".parse::<TaskStatus>().is_err());
    }
}
