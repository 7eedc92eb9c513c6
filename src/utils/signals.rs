//! Process signal handling: graceful shutdown and resume detection

use std::sync::Arc;

use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::{info, warn};

use crate::state::{AppState, ResumeSource};

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() {
    let mut signals = match Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install shutdown signal handler: {}", e);
            return futures::future::pending().await;
        }
    };

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
}

/// Forward SIGCONT (the process was stopped and is running again) to the
/// recovery handler as a resume signal
pub async fn resume_signal_task(state: Arc<AppState>) {
    let mut signals = match Signals::new([signal_hook::consts::SIGCONT]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install SIGCONT handler, relying on clock gap detection: {}", e);
            return;
        }
    };

    while let Some(signal) = signals.next().await {
        info!("Received signal: {}, process resumed", signal);
        state.signal_resume(ResumeSource::Signal);
    }
}
