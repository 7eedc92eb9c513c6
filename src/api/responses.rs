//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::TimerError,
    state::{CompletionEvent, Timer},
};

/// Response for single-timer mutations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
}

impl ApiResponse {
    pub fn new(status: String, message: String, timer: Option<Timer>) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    pub fn ok(message: String, timer: Timer) -> Self {
        Self::new("ok".to_string(), message, Some(timer))
    }

    /// Create a response for a no-op (e.g. deleting an unknown timer)
    pub fn unchanged(message: String) -> Self {
        Self::new("unchanged".to_string(), message, None)
    }

    pub fn error(message: String) -> Self {
        Self::new("error".to_string(), message, None)
    }
}

/// Snapshot of every timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersResponse {
    pub timestamp: DateTime<Utc>,
    pub timers: Vec<Timer>,
}

impl TimersResponse {
    pub fn new(timers: Vec<Timer>) -> Self {
        Self {
            timestamp: Utc::now(),
            timers,
        }
    }
}

/// Result of an explicit resume request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeResponse {
    pub timestamp: DateTime<Utc>,
    pub completed: Vec<CompletionEvent>,
    pub timers: Vec<Timer>,
}

/// Service status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer_count: usize,
    pub running_count: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetRequest {
    pub minutes: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresetRequest {
    pub ms: u64,
}

/// Engine errors rendered as JSON with a matching status code
#[derive(Debug)]
pub struct ApiError(pub TimerError);

impl From<TimerError> for ApiError {
    fn from(e: TimerError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            TimerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            TimerError::InvalidOperation(_) => StatusCode::CONFLICT,
            TimerError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ApiResponse::error(self.0.to_string()))).into_response()
    }
}
