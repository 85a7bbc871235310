use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use engagement::TaskStore as _;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    task_store: TaskStoreHealth,
}

#[derive(Serialize)]
pub struct TaskStoreHealth {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint
///
/// Probes the task store with a bounded aggregate query. Returns 200 OK
/// if it answers in time, 503 Service Unavailable otherwise.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let store_health = match tokio::time::timeout(
        std::time::Duration::from_secs(5),
        state.tasks.status_counts(),
    )
    .await
    {
        Ok(Ok(_)) => TaskStoreHealth {
            status: "ok".to_string(),
            error: None,
        },
        Ok(Err(e)) => TaskStoreHealth {
            status: "error".to_string(),
            error: Some(format!("query failed: {e}")),
        },
        Err(_) => TaskStoreHealth {
            status: "error".to_string(),
            error: Some("query timeout (>5s)".to_string()),
        },
    };

    let is_healthy = store_health.status == "ok";
    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(HealthResponse {
            status: if is_healthy { "healthy" } else { "unhealthy" }.to_string(),
            task_store: store_health,
        }),
    )
}
