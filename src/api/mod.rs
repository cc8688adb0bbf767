//! HTTP API module
//!
//! Control surface for the countdown and the daily schedule.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/set", post(set_timer_handler))
        .route("/timer/stop", post(stop_handler))
        .route("/schedule", put(schedule_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_state::tests::state_at;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn send(
        router: Router,
        method: &str,
        uri: &str,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn set_then_toggle_over_http() {
        let state = state_at(12, 0);

        let (status, body) = send(
            create_router(Arc::clone(&state)),
            "POST",
            "/timer/set",
            r#"{"minutes": 12}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["total_minutes"], 12);

        let (status, body) =
            send(create_router(Arc::clone(&state)), "POST", "/timer/toggle", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert!(state.timer.is_running());

        let (_, body) = send(create_router(Arc::clone(&state)), "GET", "/status", "").await;
        assert_eq!(body["timer"]["running"], true);
        assert_eq!(body["timer"]["origin"], "manual");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_schedule_is_a_bad_request() {
        let state = state_at(12, 0);
        let (status, body) = send(
            create_router(state),
            "PUT",
            "/schedule",
            r#"{"auto_sleep_enabled": true, "sleep_time": "12:75"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let state = state_at(12, 0);
        let (status, body) = send(create_router(state), "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
