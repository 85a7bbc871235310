//! Application setup and router configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use engagement::TaskStore;

use crate::routes::{health_handler, tasks};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tasks: Arc<dyn TaskStore>,
}

/// Build the HTTP application.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/tasks/pending", get(tasks::list_pending))
        .route("/api/tasks/stats", get(tasks::stats))
        .route("/api/tasks/status/:status", get(tasks::list_by_status))
        .route("/api/tasks/campaign/:campaign_id", get(tasks::list_by_campaign))
        .route(
            "/api/tasks/campaign/:campaign_id/stats",
            get(tasks::campaign_stats),
        )
        .route("/api/tasks/:task_id/approve", post(tasks::approve_task))
        .route("/api/tasks/:task_id/reject", post(tasks::reject_task))
        .route("/api/tasks/:task_id/status", put(tasks::update_status))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use chrono::Utc;
    use tower::ServiceExt;

    use engagement::{
        CampaignMode, MemoryStore, PersistOutcome, PersistStage, ReplySuggestion, Task,
    };

    fn suggestion(post_id: &str, campaign_id: i64) -> ReplySuggestion {
        ReplySuggestion {
            post_id: post_id.to_string(),
            campaign_id,
            reply_text: "So glad you like it!".to_string(),
            confidence: 0.85,
            short_link: None,
            post_author: "craftfan".to_string(),
            post_text: "love this sale!".to_string(),
            post_url: "https://social.example/p/1".to_string(),
            mode: CampaignMode::SemiAuto,
            is_risky: false,
            risk_reason: None,
            created_at: Utc::now(),
        }
    }

    async fn seeded_app() -> (Router, Task) {
        let store = Arc::new(MemoryStore::new());
        let stage = PersistStage::new(store.clone());
        let PersistOutcome::Created(task) = stage.process(&suggestion("t1", 5)).await.unwrap()
        else {
            panic!("expected a created task");
        };
        (build_app(AppState { tasks: store }), task)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok_with_a_working_store() {
        let (app, _) = seeded_app().await;

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn pending_list_contains_the_created_task() {
        let (app, task) = seeded_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/pending")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["id"], task.id);
        assert_eq!(body[0]["status"], "PENDING");
    }

    #[tokio::test]
    async fn approve_moves_task_to_campaign_status_query() {
        let (app, task) = seeded_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(format!("/api/tasks/{}/approve", task.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let approved = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/campaign/5?status=APPROVED")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(approved).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["status"], "APPROVED");

        let pending = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/campaign/5?status=PENDING")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(pending).await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transitioning_a_missing_task_is_404() {
        let (app, _) = seeded_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/tasks/999/reject")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_status_rejects_unknown_statuses() {
        let (app, task) = seeded_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/tasks/{}/status", task.id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "SHIPPED"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_status_posts_a_task() {
        let (app, task) = seeded_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri(format!("/api/tasks/{}/status", task.id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"status": "POSTED"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "POSTED");
    }

    #[tokio::test]
    async fn stats_count_by_status() {
        let (app, _) = seeded_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["pending"], 1);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn campaign_stats_cover_the_window() {
        let (app, _) = seeded_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/tasks/campaign/5/stats?hours=24")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["campaignId"], 5);
        assert_eq!(body["windowHours"], 24);
        assert_eq!(body["total"], 1);
        assert_eq!(body["pending"], 1);
    }
}
