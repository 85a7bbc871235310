//! Storage traits for tasks and short links.
//!
//! Uniqueness is enforced at the storage layer, not with application
//! locks: concurrent workers racing on the same post id or the same
//! `(original_url, campaign_id)` pair see a `None` from `create`/`insert`
//! and treat it as "already exists".

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{
    NewShortLink, NewTask, ShortLinkRecord, Task, TaskStatus, TaskStatusCounts,
};

/// Store for reviewable tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create a task in `Pending` status.
    ///
    /// Returns `None` if a task already exists for the same post id (the
    /// unique constraint fired), which callers absorb as a duplicate.
    async fn create(&self, task: &NewTask) -> Result<Option<Task>>;

    /// Check whether a task exists for a source post.
    async fn exists_for_post(&self, post_id: &str) -> Result<bool>;

    /// Fetch a task by id.
    async fn get(&self, id: i64) -> Result<Option<Task>>;

    /// List tasks in a given status.
    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>>;

    /// List tasks for a campaign.
    async fn list_by_campaign(&self, campaign_id: i64) -> Result<Vec<Task>>;

    /// List tasks for a campaign in a given status.
    async fn list_by_campaign_and_status(
        &self,
        campaign_id: i64,
        status: TaskStatus,
    ) -> Result<Vec<Task>>;

    /// Aggregate counts by status, including the risk count.
    async fn status_counts(&self) -> Result<TaskStatusCounts>;

    /// Count tasks for a campaign created after `since`.
    async fn count_for_campaign_since(
        &self,
        campaign_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64>;

    /// Count tasks for a campaign in a given status created after `since`.
    async fn count_for_campaign_status_since(
        &self,
        campaign_id: i64,
        status: TaskStatus,
        since: DateTime<Utc>,
    ) -> Result<i64>;

    /// Set a task's status, returning the updated task.
    ///
    /// Returns `None` if the task does not exist. Transition legality
    /// beyond existence is the caller's policy.
    async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>>;
}

/// Persistent cache of generated short links.
#[async_trait]
pub trait ShortLinkStore: Send + Sync {
    /// Look up the record for a `(original_url, campaign_id)` pair.
    async fn find(&self, original_url: &str, campaign_id: i64)
        -> Result<Option<ShortLinkRecord>>;

    /// Insert a new record.
    ///
    /// Returns `None` if a record already exists for the pair (a racing
    /// worker persisted first); callers re-read and reuse it.
    async fn insert(&self, link: &NewShortLink) -> Result<Option<ShortLinkRecord>>;
}
