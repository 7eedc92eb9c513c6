//! Effects dispatch background task

use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{debug, info, warn};

use crate::{
    effects::EffectsSink,
    state::{AppState, CompletionEvent},
};

/// Background task that hands every completion event to the effects sink
pub async fn effects_task(state: Arc<AppState>, sink: Arc<dyn EffectsSink>) {
    info!("Starting effects dispatcher with {} sink", sink.name());
    let completion_rx = state.subscribe_completions();
    dispatch_completions(completion_rx, sink).await;
}

/// Deliver completions from an existing subscription until the channel closes.
///
/// Sink failures are logged and dropped; the completion is already committed.
pub async fn dispatch_completions(mut completion_rx: Receiver<CompletionEvent>, sink: Arc<dyn EffectsSink>) {
    loop {
        match completion_rx.recv().await {
            Ok(event) => {
                debug!("Dispatching completion of {} to {} sink", event.timer_name, sink.name());
                if let Err(e) = sink.deliver(event).await {
                    warn!("Effects sink {} failed: {:#}", sink.name(), e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Effects dispatcher dropped {} completion event(s)", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Completion channel closed, stopping effects dispatcher");
                break;
            }
        }
    }
}
