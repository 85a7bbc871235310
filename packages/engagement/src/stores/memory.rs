//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::traits::store::{ShortLinkStore, TaskStore};
use crate::types::{
    NewShortLink, NewTask, ShortLinkRecord, Task, TaskStatus, TaskStatusCounts,
};

/// In-memory task and short-link store.
///
/// Useful for tests and development. Not suitable for production as data
/// is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<i64, Task>>,
    links: RwLock<Vec<ShortLinkRecord>>,
    next_task_id: AtomicI64,
    next_link_id: AtomicI64,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Number of stored short links.
    pub fn link_count(&self) -> usize {
        self.links.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create(&self, task: &NewTask) -> Result<Option<Task>> {
        // Uniqueness check and insert under one write lock, matching the
        // constraint semantics of the database store
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        if tasks.values().any(|t| t.post_id == task.post_id) {
            return Ok(None);
        }

        let id = self.next_task_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let created = Task {
            id,
            post_id: task.post_id.clone(),
            campaign_id: task.campaign_id,
            reply_text: task.reply_text.clone(),
            mode: task.mode,
            status: TaskStatus::Pending,
            post_author: task.post_author.clone(),
            post_text: task.post_text.clone(),
            post_url: task.post_url.clone(),
            confidence: task.confidence,
            short_link: task.short_link.clone(),
            is_risky: task.is_risky,
            risk_reason: task.risk_reason.clone(),
            created_at: now,
            updated_at: now,
        };
        tasks.insert(id, created.clone());
        Ok(Some(created))
    }

    async fn exists_for_post(&self, post_id: &str) -> Result<bool> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .any(|t| t.post_id == post_id))
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned())
    }

    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }

    async fn list_by_campaign(&self, campaign_id: i64) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|t| t.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn list_by_campaign_and_status(
        &self,
        campaign_id: i64,
        status: TaskStatus,
    ) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|t| t.campaign_id == campaign_id && t.status == status)
            .cloned()
            .collect())
    }

    async fn status_counts(&self) -> Result<TaskStatusCounts> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        let mut counts = TaskStatusCounts::default();
        for task in tasks.values() {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::Approved => counts.approved += 1,
                TaskStatus::Rejected => counts.rejected += 1,
                TaskStatus::Posted => counts.posted += 1,
            }
            if task.is_risky == Some(true) {
                counts.risky += 1;
            }
            counts.total += 1;
        }
        Ok(counts)
    }

    async fn count_for_campaign_since(
        &self,
        campaign_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|t| t.campaign_id == campaign_id && t.created_at > since)
            .count() as i64)
    }

    async fn count_for_campaign_status_since(
        &self,
        campaign_id: i64,
        status: TaskStatus,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .tasks
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|t| {
                t.campaign_id == campaign_id && t.status == status && t.created_at > since
            })
            .count() as i64)
    }

    async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>> {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        match tasks.get_mut(&id) {
            Some(task) => {
                task.status = status;
                task.updated_at = Utc::now();
                Ok(Some(task.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ShortLinkStore for MemoryStore {
    async fn find(
        &self,
        original_url: &str,
        campaign_id: i64,
    ) -> Result<Option<ShortLinkRecord>> {
        Ok(self
            .links
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|l| l.original_url == original_url && l.campaign_id == campaign_id)
            .cloned())
    }

    async fn insert(&self, link: &NewShortLink) -> Result<Option<ShortLinkRecord>> {
        let mut links = self.links.write().unwrap_or_else(|e| e.into_inner());
        if links
            .iter()
            .any(|l| l.original_url == link.original_url && l.campaign_id == link.campaign_id)
        {
            return Ok(None);
        }

        let id = self.next_link_id.fetch_add(1, Ordering::SeqCst) + 1;
        let record = ShortLinkRecord {
            id,
            original_url: link.original_url.clone(),
            campaign_id: link.campaign_id,
            product_id: link.product_id,
            short_url: link.short_url.clone(),
            provider: link.provider,
            click_count: 0,
            created_at: Utc::now(),
        };
        links.push(record.clone());
        Ok(Some(record))
    }
}
