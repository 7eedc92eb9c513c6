//! Recovery handler background task

use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

use crate::state::{now_ms, AppState, ResumeSource};

/// Background task that runs a full recomputation pass whenever the host
/// reports a resume from suspension
pub async fn recovery_task(state: Arc<AppState>) {
    info!("Starting recovery handler");
    let resume_rx = state.subscribe_resume();
    handle_resumes(state, resume_rx).await;
}

/// Drive recovery passes from an existing resume subscription until the
/// channel closes
pub async fn handle_resumes(state: Arc<AppState>, mut resume_rx: Receiver<ResumeSource>) {
    loop {
        match resume_rx.recv().await {
            Ok(source) => {
                let completions = state.recover(now_ms());
                info!(
                    "Recovery after {:?} resume completed {} timer(s)",
                    source,
                    completions.len()
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                // Several resumes piled up; one pass covers all of them
                warn!("Recovery handler lagged by {} resume signal(s)", skipped);
                state.recover(now_ms());
            }
            Err(RecvError::Closed) => {
                info!("Resume channel closed, stopping recovery handler");
                break;
            }
        }
    }
}
