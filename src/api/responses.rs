//! API request and response structures

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{ArmPlan, SleepSettings},
    state::TimerState,
};

/// Body of POST /timer/set
#[derive(Debug, Clone, Deserialize)]
pub struct SetTimerRequest {
    pub minutes: i64,
}

/// Body of PUT /schedule
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRequest {
    pub auto_sleep_enabled: bool,
    /// HH:MM, local time
    pub sleep_time: String,
    /// Keeps the current default when absent
    pub default_timer: Option<i64>,
}

/// API response structure for countdown endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: TimerState) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn running(message: String, timer: TimerState) -> Self {
        Self::new("running", message, timer)
    }

    pub fn stopped(message: String, timer: TimerState) -> Self {
        Self::new("stopped", message, timer)
    }

    /// The request was valid but had no effect
    pub fn ignored(message: String, timer: TimerState) -> Self {
        Self::new("ignored", message, timer)
    }
}

/// Response of PUT /schedule
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub settings: SleepSettings,
    pub plan: Option<ArmPlan>,
    pub next_wakeup: Option<NaiveDateTime>,
    pub timer: TimerState,
}

/// Status response with countdown and schedule information
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub schedule: Option<SleepSettings>,
    pub next_wakeup: Option<NaiveDateTime>,
    pub lead_minutes: u32,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
    pub errors: Vec<String>,
}

/// Error body for rejected requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponse {
    pub fn new(message: String) -> Self {
        Self {
            status: "error".to_string(),
            message,
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
