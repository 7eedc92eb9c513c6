//! HTTP endpoint handlers

use std::{sync::Arc, time::Duration};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    state::{now_ms, AppState, ResumeSource, TimerId},
};
use super::responses::{
    ApiError, ApiResponse, HealthResponse, NameRequest, PresetRequest, ResumeResponse,
    StatusResponse, TargetRequest, TimersResponse,
};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// How long a watch request waits for a change before returning the current snapshot
const WATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Log rejected mutations before turning them into an HTTP error
fn rejected(action: &'static str, id: Option<TimerId>) -> impl FnOnce(TimerError) -> ApiError {
    move |e| {
        match id {
            Some(id) => warn!("Rejected {} on {}: {}", action, id, e),
            None => warn!("Rejected {}: {}", action, e),
        }
        ApiError(e)
    }
}

/// Handle GET /timers - Snapshot of every timer
pub async fn list_timers_handler(State(state): State<Arc<AppState>>) -> Json<TimersResponse> {
    Json(TimersResponse::new(state.snapshot()))
}

/// Handle GET /watch - Long-poll: wait for the next committed change, then
/// return the snapshot
pub async fn watch_timers_handler(State(state): State<Arc<AppState>>) -> Json<TimersResponse> {
    let mut snapshot_rx = state.subscribe_snapshots();
    match tokio::time::timeout(WATCH_TIMEOUT, snapshot_rx.changed()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Snapshot channel closed: {}", e),
        Err(_) => debug!("Watch request timed out without changes"),
    }
    let timers = snapshot_rx.borrow_and_update().clone();
    Json(TimersResponse::new(timers))
}

/// Handle POST /timers - Add a stopwatch timer
pub async fn add_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NameRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    let timer = state.add(&request.name).map_err(rejected("add", None))?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Timer added".to_string(), timer))))
}

/// Handle GET /timers/:id
pub async fn get_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    let timer = state.get(id)?;
    Ok(Json(ApiResponse::ok("Timer found".to_string(), timer)))
}

/// Handle DELETE /timers/:id - Unknown ids are not an error
pub async fn delete_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Json<ApiResponse> {
    match state.delete(id) {
        Some(timer) => Json(ApiResponse::ok("Timer deleted".to_string(), timer)),
        None => Json(ApiResponse::unchanged(format!("No timer with id {}", id))),
    }
}

/// Handle PATCH /timers/:id - Rename
pub async fn rename_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<NameRequest>,
) -> ApiResult<ApiResponse> {
    let timer = state.rename(id, &request.name).map_err(rejected("rename", Some(id)))?;
    Ok(Json(ApiResponse::ok("Timer renamed".to_string(), timer)))
}

/// Handle POST /timers/:id/start
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    let timer = state.start(id, now_ms()).map_err(rejected("start", Some(id)))?;
    Ok(Json(ApiResponse::ok("Timer running".to_string(), timer)))
}

/// Handle POST /timers/:id/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    let timer = state.pause(id, now_ms()).map_err(rejected("pause", Some(id)))?;
    Ok(Json(ApiResponse::ok("Timer paused".to_string(), timer)))
}

/// Handle POST /timers/:id/reset
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    let timer = state.reset(id).map_err(rejected("reset", Some(id)))?;
    Ok(Json(ApiResponse::ok("Timer reset".to_string(), timer)))
}

/// Handle POST /timers/:id/zero
pub async fn zero_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    let timer = state.zero(id).map_err(rejected("zero", Some(id)))?;
    Ok(Json(ApiResponse::ok("Timer zeroed".to_string(), timer)))
}

/// Handle POST /timers/:id/mode - Toggle stopwatch/countdown
pub async fn toggle_mode_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> ApiResult<ApiResponse> {
    let timer = state.toggle_mode(id).map_err(rejected("toggle-mode", Some(id)))?;
    Ok(Json(ApiResponse::ok(format!("Timer is now {:?}", timer.mode), timer)))
}

/// Handle PUT /timers/:id/target - Countdown target in minutes
pub async fn target_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<TargetRequest>,
) -> ApiResult<ApiResponse> {
    let timer = state
        .set_target_duration(id, request.minutes)
        .map_err(rejected("set-target", Some(id)))?;
    Ok(Json(ApiResponse::ok("Target duration set".to_string(), timer)))
}

/// Handle POST /timers/:id/preset - Preset duration in milliseconds
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<PresetRequest>,
) -> ApiResult<ApiResponse> {
    let timer = state.apply_preset(id, request.ms).map_err(rejected("preset", Some(id)))?;
    Ok(Json(ApiResponse::ok("Preset applied".to_string(), timer)))
}

/// Handle POST /resume - Host reports it came back from suspension
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Json<ResumeResponse> {
    state.signal_resume(ResumeSource::Api);
    let completed = state.recover(now_ms());
    info!("Resume endpoint called - {} timer(s) completed during suspension", completed.len());

    Json(ResumeResponse {
        timestamp: chrono::Utc::now(),
        completed,
        timers: state.snapshot(),
    })
}

/// Handle GET /status - Service status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let timers = state.snapshot();
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer_count: timers.len(),
        running_count: timers.iter().filter(|t| t.is_running).count(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
