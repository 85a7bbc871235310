//! PostgreSQL storage implementation.
//!
//! Production backend for tasks and short links. Uniqueness constraints
//! on `tasks.post_id` and `short_links (original_url, campaign_id)` carry
//! the pipeline's idempotency guarantees; racing workers see an insert
//! conflict and treat it as "already exists".

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use tracing::info;

use crate::error::{EngagementError, Result};
use crate::traits::store::{ShortLinkStore, TaskStore};
use crate::types::{
    NewShortLink, NewTask, ShortLinkRecord, Task, TaskStatus, TaskStatusCounts,
};

/// PostgreSQL-backed task and short-link store.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store with the given connection URL.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(storage_err)?;

        Self::from_pool(pool).await
    }

    /// Create a store from an existing connection pool.
    ///
    /// Use this when the application already has a `PgPool`; it avoids
    /// duplicate connections.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        let store = Self { pool };
        store.bootstrap_schema().await?;
        Ok(store)
    }

    /// Access the underlying pool (health checks).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables and indexes if they do not exist yet.
    async fn bootstrap_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id BIGSERIAL PRIMARY KEY,
                post_id TEXT NOT NULL UNIQUE,
                campaign_id BIGINT NOT NULL,
                reply_text TEXT NOT NULL,
                mode TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                post_author TEXT,
                post_text TEXT,
                post_url TEXT,
                confidence DOUBLE PRECISION,
                short_link TEXT,
                is_risky BOOLEAN,
                risk_reason TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_campaign ON tasks (campaign_id)")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks (status)")
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS short_links (
                id BIGSERIAL PRIMARY KEY,
                original_url TEXT NOT NULL,
                campaign_id BIGINT NOT NULL,
                product_id BIGINT,
                short_url TEXT NOT NULL UNIQUE,
                provider TEXT NOT NULL,
                click_count INTEGER NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                UNIQUE (original_url, campaign_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        info!("task and short-link schema ready");
        Ok(())
    }
}

fn storage_err(e: sqlx::Error) -> EngagementError {
    EngagementError::Storage(e.to_string().into())
}

const TASK_COLUMNS: &str = "id, post_id, campaign_id, reply_text, mode, status, post_author, \
                            post_text, post_url, confidence, short_link, is_risky, risk_reason, \
                            created_at, updated_at";

#[derive(FromRow)]
struct TaskRow {
    id: i64,
    post_id: String,
    campaign_id: i64,
    reply_text: String,
    mode: String,
    status: String,
    post_author: Option<String>,
    post_text: Option<String>,
    post_url: Option<String>,
    confidence: Option<f64>,
    short_link: Option<String>,
    is_risky: Option<bool>,
    risk_reason: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_task(self) -> Result<Task> {
        Ok(Task {
            id: self.id,
            post_id: self.post_id,
            campaign_id: self.campaign_id,
            reply_text: self.reply_text,
            mode: self
                .mode
                .parse()
                .map_err(|e: String| EngagementError::Storage(e.into()))?,
            status: self
                .status
                .parse()
                .map_err(|e: String| EngagementError::Storage(e.into()))?,
            post_author: self.post_author,
            post_text: self.post_text,
            post_url: self.post_url,
            confidence: self.confidence,
            short_link: self.short_link,
            is_risky: self.is_risky,
            risk_reason: self.risk_reason,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn rows_into_tasks(rows: Vec<TaskRow>) -> Result<Vec<Task>> {
    rows.into_iter().map(TaskRow::into_task).collect()
}

#[derive(FromRow)]
struct ShortLinkRow {
    id: i64,
    original_url: String,
    campaign_id: i64,
    product_id: Option<i64>,
    short_url: String,
    provider: String,
    click_count: i32,
    created_at: DateTime<Utc>,
}

impl ShortLinkRow {
    fn into_record(self) -> Result<ShortLinkRecord> {
        Ok(ShortLinkRecord {
            id: self.id,
            original_url: self.original_url,
            campaign_id: self.campaign_id,
            product_id: self.product_id,
            short_url: self.short_url,
            provider: self
                .provider
                .parse()
                .map_err(|e: String| EngagementError::Storage(e.into()))?,
            click_count: self.click_count,
            created_at: self.created_at,
        })
    }
}

#[async_trait]
impl TaskStore for PostgresStore {
    async fn create(&self, task: &NewTask) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO tasks (post_id, campaign_id, reply_text, mode, status, post_author,
                               post_text, post_url, confidence, short_link, is_risky, risk_reason)
            VALUES ($1, $2, $3, $4, 'PENDING', $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (post_id) DO NOTHING
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(&task.post_id)
        .bind(task.campaign_id)
        .bind(&task.reply_text)
        .bind(task.mode.to_string())
        .bind(&task.post_author)
        .bind(&task.post_text)
        .bind(&task.post_url)
        .bind(task.confidence)
        .bind(&task.short_link)
        .bind(task.is_risky)
        .bind(&task.risk_reason)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(TaskRow::into_task).transpose()
    }

    async fn exists_for_post(&self, post_id: &str) -> Result<bool> {
        let exists: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM tasks WHERE post_id = $1)")
                .bind(post_id)
                .fetch_one(&self.pool)
                .await
                .map_err(storage_err)?;
        Ok(exists.0)
    }

    async fn get(&self, id: i64) -> Result<Option<Task>> {
        let row: Option<TaskRow> =
            sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_err)?;
        row.map(TaskRow::into_task).transpose()
    }

    async fn list_by_status(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE status = $1 ORDER BY created_at DESC"
        ))
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows_into_tasks(rows)
    }

    async fn list_by_campaign(&self, campaign_id: i64) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE campaign_id = $1 ORDER BY created_at DESC"
        ))
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows_into_tasks(rows)
    }

    async fn list_by_campaign_and_status(
        &self,
        campaign_id: i64,
        status: TaskStatus,
    ) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE campaign_id = $1 AND status = $2 \
             ORDER BY created_at DESC"
        ))
        .bind(campaign_id)
        .bind(status.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        rows_into_tasks(rows)
    }

    async fn status_counts(&self) -> Result<TaskStatusCounts> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM tasks GROUP BY status")
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;

        let mut counts = TaskStatusCounts::default();
        for (status, count) in rows {
            match status.parse::<TaskStatus>() {
                Ok(TaskStatus::Pending) => counts.pending = count,
                Ok(TaskStatus::Approved) => counts.approved = count,
                Ok(TaskStatus::Rejected) => counts.rejected = count,
                Ok(TaskStatus::Posted) => counts.posted = count,
                Err(e) => return Err(EngagementError::Storage(e.into())),
            }
            counts.total += count;
        }

        let risky: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE is_risky = TRUE")
                .fetch_one(&self.pool)
                .await
                .map_err(storage_err)?;
        counts.risky = risky.0;

        Ok(counts)
    }

    async fn count_for_campaign_since(
        &self,
        campaign_id: i64,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE campaign_id = $1 AND created_at > $2",
        )
        .bind(campaign_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(count.0)
    }

    async fn count_for_campaign_status_since(
        &self,
        campaign_id: i64,
        status: TaskStatus,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks \
             WHERE campaign_id = $1 AND status = $2 AND created_at > $3",
        )
        .bind(campaign_id)
        .bind(status.to_string())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(count.0)
    }

    async fn set_status(&self, id: i64, status: TaskStatus) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET status = $2, updated_at = now() WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(status.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        row.map(TaskRow::into_task).transpose()
    }
}

const LINK_COLUMNS: &str =
    "id, original_url, campaign_id, product_id, short_url, provider, click_count, created_at";

#[async_trait]
impl ShortLinkStore for PostgresStore {
    async fn find(
        &self,
        original_url: &str,
        campaign_id: i64,
    ) -> Result<Option<ShortLinkRecord>> {
        let row: Option<ShortLinkRow> = sqlx::query_as(&format!(
            "SELECT {LINK_COLUMNS} FROM short_links \
             WHERE original_url = $1 AND campaign_id = $2"
        ))
        .bind(original_url)
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        row.map(ShortLinkRow::into_record).transpose()
    }

    async fn insert(&self, link: &NewShortLink) -> Result<Option<ShortLinkRecord>> {
        let row: Option<ShortLinkRow> = sqlx::query_as(&format!(
            r#"
            INSERT INTO short_links (original_url, campaign_id, product_id, short_url, provider)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (original_url, campaign_id) DO NOTHING
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&link.original_url)
        .bind(link.campaign_id)
        .bind(link.product_id)
        .bind(&link.short_url)
        .bind(link.provider.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;
        row.map(ShortLinkRow::into_record).transpose()
    }
}
