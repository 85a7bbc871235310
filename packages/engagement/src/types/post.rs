//! Discovered post event payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post discovered by the upstream crawler, consumed once from the
/// `posts.discovered` stream. Immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredPost {
    /// Source-platform post identifier, the partition key for the pipeline.
    pub post_id: String,

    /// Campaign this post was discovered for.
    pub campaign_id: i64,

    pub author: String,
    pub text: String,
    pub url: String,

    // Engagement metadata from the source platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposts: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_without_optional_metadata() {
        let json = r#"{
            "postId": "p-1",
            "campaignId": 5,
            "author": "craftfan",
            "text": "love this sale!",
            "url": "https://social.example/p/1",
            "createdAt": "2025-06-01T12:00:00Z"
        }"#;

        let post: DiscoveredPost = serde_json::from_str(json).unwrap();
        assert_eq!(post.post_id, "p-1");
        assert_eq!(post.campaign_id, 5);
        assert!(post.likes.is_none());
    }
}
