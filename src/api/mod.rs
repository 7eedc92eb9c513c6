//! HTTP API module
//!
//! Presentation-layer access to the timer engine: the mutation API, the
//! snapshot read and an explicit resume signal.

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
        .route("/timers", get(list_timers_handler).post(add_timer_handler))
        .route(
            "/timers/:id",
            get(get_timer_handler)
                .patch(rename_timer_handler)
                .delete(delete_timer_handler),
        )
        .route("/timers/:id/start", post(start_handler))
        .route("/timers/:id/pause", post(pause_handler))
        .route("/timers/:id/reset", post(reset_handler))
        .route("/timers/:id/zero", post(zero_handler))
        .route("/timers/:id/mode", post(toggle_mode_handler))
        .route("/timers/:id/target", put(target_handler))
        .route("/timers/:id/preset", post(preset_handler))
        .route("/watch", get(watch_timers_handler))
        .route("/resume", post(resume_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
