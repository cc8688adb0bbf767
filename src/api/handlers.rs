//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    engine::{SetOutcome, SleepSettings, TimeOfDay, Toggle},
    error::{validate_minutes, EngineError},
    state::AppState,
};
use super::responses::{
    ApiResponse, ErrorResponse, HealthResponse, ScheduleRequest, ScheduleResponse,
    SetTimerRequest, StatusResponse,
};

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: EngineError) -> ApiError {
    warn!("Rejected request: {}", error);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(error.to_string())))
}

/// Handle POST /timer/toggle - Start or cancel the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let outcome = state.toggle_timer();
    let timer = state.get_timer_state();

    let response = match outcome {
        Toggle::Started => ApiResponse::running(
            format!("Countdown started for {} minutes", timer.total_minutes),
            timer,
        ),
        Toggle::Cancelled => ApiResponse::stopped("Countdown cancelled".to_string(), timer),
        Toggle::Ignored => {
            ApiResponse::ignored("Countdown is set to 0 minutes".to_string(), timer)
        }
    };
    info!("Toggle endpoint called - {}", response.message);
    Json(response)
}

/// Handle POST /timer/set - Set the countdown duration
pub async fn set_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetTimerRequest>,
) -> Result<Json<ApiResponse>, ApiError> {
    let minutes = validate_minutes(request.minutes).map_err(bad_request)?;

    let response = match state.set_timer(minutes) {
        SetOutcome::Applied => ApiResponse::stopped(
            format!("Countdown set to {} minutes", minutes),
            state.get_timer_state(),
        ),
        SetOutcome::IgnoredWhileRunning => ApiResponse::ignored(
            "Countdown is running, stop it before changing its duration".to_string(),
            state.get_timer_state(),
        ),
    };
    Ok(Json(response))
}

/// Handle POST /timer/stop - Cancel the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> Json<ApiResponse> {
    let response = if state.stop_timer() {
        info!("Stop endpoint called - countdown cancelled");
        ApiResponse::stopped("Countdown cancelled".to_string(), state.get_timer_state())
    } else {
        ApiResponse::ignored("No countdown running".to_string(), state.get_timer_state())
    };
    Json(response)
}

/// Handle PUT /schedule - Replace the daily auto-sleep schedule
pub async fn schedule_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ScheduleRequest>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let target = request.sleep_time.parse::<TimeOfDay>().map_err(bad_request)?;
    let default_manual_minutes = match request.default_timer {
        Some(minutes) => validate_minutes(minutes).map_err(bad_request)?,
        None => state
            .scheduler
            .settings()
            .map(|s| s.default_manual_minutes)
            .unwrap_or_default(),
    };

    let settings = SleepSettings {
        auto_sleep_enabled: request.auto_sleep_enabled,
        target,
        default_manual_minutes,
    };
    let plan = state.configure_schedule(settings);

    Ok(Json(ScheduleResponse {
        status: (if settings.auto_sleep_enabled { "enabled" } else { "disabled" }).to_string(),
        timestamp: Utc::now(),
        settings,
        plan,
        next_wakeup: state.scheduler.next_wakeup(),
        timer: state.get_timer_state(),
    }))
}

/// Handle GET /status - Return countdown and schedule status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.get_timer_state(),
        schedule: state.scheduler.settings(),
        next_wakeup: state.scheduler.next_wakeup(),
        lead_minutes: state.scheduler.lead_minutes(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
        errors: state.get_errors(),
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{engine::ArmPlan, state::app_state::tests::state_at};

    #[tokio::test(start_paused = true)]
    async fn toggle_reports_each_transition() {
        let state = state_at(12, 0);

        let Json(response) = toggle_handler(State(Arc::clone(&state))).await;
        assert_eq!(response.status, "ignored");

        state.set_timer(10);
        let Json(response) = toggle_handler(State(Arc::clone(&state))).await;
        assert_eq!(response.status, "running");
        assert_eq!(response.timer.remaining_minutes, 10);

        let Json(response) = toggle_handler(State(Arc::clone(&state))).await;
        assert_eq!(response.status, "stopped");
        assert!(!response.timer.running);
    }

    #[tokio::test(start_paused = true)]
    async fn set_rejects_negative_minutes() {
        let state = state_at(12, 0);
        let (status, Json(body)) = set_timer_handler(
            State(Arc::clone(&state)),
            Json(SetTimerRequest { minutes: -3 }),
        )
        .await
        .unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.message.contains("negative"));
    }

    #[tokio::test(start_paused = true)]
    async fn set_is_ignored_while_running() {
        let state = state_at(12, 0);
        state.set_timer(10);
        state.toggle_timer();

        let Json(response) = set_timer_handler(
            State(Arc::clone(&state)),
            Json(SetTimerRequest { minutes: 3 }),
        )
        .await
        .unwrap();
        assert_eq!(response.status, "ignored");
        assert_eq!(response.timer.total_minutes, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_without_countdown_is_ignored() {
        let state = state_at(12, 0);
        let Json(response) = stop_handler(State(state)).await;
        assert_eq!(response.status, "ignored");
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_inside_lead_window_arms_now() {
        let state = state_at(23, 45);
        let Json(response) = schedule_handler(
            State(Arc::clone(&state)),
            Json(ScheduleRequest {
                auto_sleep_enabled: true,
                sleep_time: "00:15".to_string(),
                default_timer: Some(25),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status, "enabled");
        assert!(matches!(
            response.plan,
            Some(ArmPlan::Immediate { minutes: 30, .. })
        ));
        assert!(response.timer.running);
        assert!(response.next_wakeup.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn schedule_rejects_malformed_time() {
        let state = state_at(12, 0);
        let (status, _) = schedule_handler(
            State(state),
            Json(ScheduleRequest {
                auto_sleep_enabled: true,
                sleep_time: "25:00".to_string(),
                default_timer: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn status_reflects_schedule() {
        let state = state_at(12, 0);
        state.configure_schedule(SleepSettings {
            auto_sleep_enabled: true,
            target: TimeOfDay::new(22, 30).unwrap(),
            default_manual_minutes: 15,
        });

        let Json(status) = status_handler(State(state)).await;
        assert_eq!(status.timer.total_minutes, 15);
        assert_eq!(status.lead_minutes, 30);
        assert_eq!(
            status.next_wakeup.map(|t| t.format("%H:%M").to_string()),
            Some("22:00".to_string())
        );
        assert_eq!(status.last_action.as_deref(), Some("schedule"));
    }

    #[tokio::test(start_paused = true)]
    async fn status_follows_the_running_countdown() {
        let state = state_at(12, 0);
        state.set_timer(5);
        state.toggle_timer();

        tokio::time::sleep(std::time::Duration::from_secs(2 * 60 + 5)).await;
        let Json(status) = status_handler(State(state)).await;
        assert!(status.timer.running);
        assert_eq!(status.timer.remaining_minutes, 3);
    }
}
