//! Task query and command surface.
//!
//! Listing, aggregate statistics, and status transitions for the tasks
//! the pipeline creates. Transition legality beyond task existence is the
//! caller's policy; this surface only requires that the task exists.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use engagement::{EngagementError, Task, TaskStatus, TaskStatusCounts, TaskStore as _};

use crate::app::AppState;

fn internal_error(e: EngagementError) -> StatusCode {
    error!(error = %e, "task store error");
    StatusCode::INTERNAL_SERVER_ERROR
}

fn parse_status(raw: &str) -> Result<TaskStatus, StatusCode> {
    raw.parse().map_err(|_| StatusCode::BAD_REQUEST)
}

/// GET /api/tasks/pending
pub async fn list_pending(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    state
        .tasks
        .list_by_status(TaskStatus::Pending)
        .await
        .map(Json)
        .map_err(internal_error)
}

/// GET /api/tasks/status/{status}
pub async fn list_by_status(
    Extension(state): Extension<AppState>,
    Path(status): Path<String>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    let status = parse_status(&status)?;
    state
        .tasks
        .list_by_status(status)
        .await
        .map(Json)
        .map_err(internal_error)
}

#[derive(Deserialize)]
pub struct CampaignTasksQuery {
    status: Option<String>,
}

/// GET /api/tasks/campaign/{campaign_id}?status=
pub async fn list_by_campaign(
    Extension(state): Extension<AppState>,
    Path(campaign_id): Path<i64>,
    Query(query): Query<CampaignTasksQuery>,
) -> Result<Json<Vec<Task>>, StatusCode> {
    let tasks = match query.status.as_deref() {
        Some(raw) => {
            let status = parse_status(raw)?;
            state
                .tasks
                .list_by_campaign_and_status(campaign_id, status)
                .await
        }
        None => state.tasks.list_by_campaign(campaign_id).await,
    };
    tasks.map(Json).map_err(internal_error)
}

/// GET /api/tasks/stats
pub async fn stats(
    Extension(state): Extension<AppState>,
) -> Result<Json<TaskStatusCounts>, StatusCode> {
    state
        .tasks
        .status_counts()
        .await
        .map(Json)
        .map_err(internal_error)
}

#[derive(Deserialize)]
pub struct CampaignStatsQuery {
    hours: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub campaign_id: i64,
    pub window_hours: i64,
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub posted: i64,
}

/// GET /api/tasks/campaign/{campaign_id}/stats?hours=24
pub async fn campaign_stats(
    Extension(state): Extension<AppState>,
    Path(campaign_id): Path<i64>,
    Query(query): Query<CampaignStatsQuery>,
) -> Result<Json<CampaignStats>, StatusCode> {
    let window_hours = query.hours.unwrap_or(24).clamp(1, 24 * 30);
    let since = Utc::now() - Duration::hours(window_hours);

    let total = state
        .tasks
        .count_for_campaign_since(campaign_id, since)
        .await
        .map_err(internal_error)?;

    let mut by_status = [0i64; 4];
    for (slot, status) in by_status.iter_mut().zip([
        TaskStatus::Pending,
        TaskStatus::Approved,
        TaskStatus::Rejected,
        TaskStatus::Posted,
    ]) {
        *slot = state
            .tasks
            .count_for_campaign_status_since(campaign_id, status, since)
            .await
            .map_err(internal_error)?;
    }

    Ok(Json(CampaignStats {
        campaign_id,
        window_hours,
        total,
        pending: by_status[0],
        approved: by_status[1],
        rejected: by_status[2],
        posted: by_status[3],
    }))
}

/// POST /api/tasks/{task_id}/approve
pub async fn approve_task(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, StatusCode> {
    transition(&state, task_id, TaskStatus::Approved).await
}

/// POST /api/tasks/{task_id}/reject
pub async fn reject_task(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<i64>,
) -> Result<Json<Task>, StatusCode> {
    transition(&state, task_id, TaskStatus::Rejected).await
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    status: String,
}

/// PUT /api/tasks/{task_id}/status
pub async fn update_status(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<i64>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Task>, StatusCode> {
    let status = parse_status(&body.status)?;
    transition(&state, task_id, status).await
}

async fn transition(
    state: &AppState,
    task_id: i64,
    status: TaskStatus,
) -> Result<Json<Task>, StatusCode> {
    match state.tasks.set_status(task_id, status).await {
        Ok(Some(task)) => Ok(Json(task)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(internal_error(e)),
    }
}
