//! Event stream publishing.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Subjects used by the pipeline. The final token of a concrete subject is
/// the source-post id, which acts as the partition key: events for the
/// same post always land in order on the same consumer.
pub mod subjects {
    /// Discovered posts from the upstream crawler.
    pub const POSTS_DISCOVERED: &str = "posts.discovered";

    /// Synthesized reply suggestions awaiting persistence.
    pub const REPLIES_SUGGESTED: &str = "replies.suggested";

    /// Quarantined events that failed unrecoverable processing.
    pub const DEAD_LETTER: &str = "deadletter.posts";

    /// Build a keyed subject: `{prefix}.{key}`.
    pub fn keyed(prefix: &str, key: &str) -> String {
        format!("{prefix}.{key}")
    }
}

/// Publisher for pipeline events.
///
/// Implementations wrap the real message broker; tests use the capturing
/// publisher from the `testing` module.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a payload to a subject.
    async fn publish(&self, subject: String, payload: Bytes) -> Result<()>;
}
