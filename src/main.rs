//! Bench Timers - Multi-timer stopwatch/countdown service
//!
//! This is the main entry point for the bench-timers application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use bench_timers::{
    api::create_router,
    config::Config,
    effects::{CommandSink, EffectsSink, LogSink},
    state::AppState,
    tasks::{effects_task, recovery_task, scheduler_loop_task},
    utils::{resume_signal_task, shutdown_signal},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("bench_timers={},tower_http=info", config.log_level()))
        .init();

    info!("Starting bench-timers server v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, tick={}ms, threshold={}ms, wake_gap={}s",
        config.host, config.port, config.tick_ms, config.threshold_ms, config.wake_gap_secs
    );

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.engine_settings()));
    state.seed_timers(config.initial_timers)?;

    let command_sink = CommandSink::new(config.alarm_command.as_deref(), config.notify);
    let sink: Arc<dyn EffectsSink> = if command_sink.is_noop() {
        Arc::new(LogSink)
    } else {
        Arc::new(command_sink)
    };

    // Subscribers first, so nothing raised by the scheduler loop is missed
    tokio::spawn(effects_task(Arc::clone(&state), sink));
    tokio::spawn(recovery_task(Arc::clone(&state)));
    tokio::spawn(resume_signal_task(Arc::clone(&state)));
    tokio::spawn(scheduler_loop_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers            - List timers");
    info!("  POST   /timers            - Add a timer");
    info!("  GET    /watch             - Wait for the next timer change");
    info!("  PATCH  /timers/:id        - Rename a timer");
    info!("  DELETE /timers/:id        - Delete a timer");
    info!("  POST   /timers/:id/start|pause|reset|zero|mode");
    info!("  PUT    /timers/:id/target - Set countdown target (minutes)");
    info!("  POST   /timers/:id/preset - Apply a preset (ms)");
    info!("  POST   /resume            - Report resume from suspension");
    info!("  GET    /status            - Service status");
    info!("  GET    /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
