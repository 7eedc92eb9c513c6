//! Effects sink contract

use futures::future::{self, BoxFuture};
use tracing::info;

use crate::state::CompletionEvent;

/// Consumer of completion events.
///
/// Delivery is fire-and-forget from the engine's point of view: the timer
/// has already been committed as completed, so an error here is only logged.
pub trait EffectsSink: Send + Sync {
    /// Short label used in log lines
    fn name(&self) -> &str;

    fn deliver(&self, event: CompletionEvent) -> BoxFuture<'static, anyhow::Result<()>>;
}

/// Sink that only records completions in the log
#[derive(Debug, Default, Clone)]
pub struct LogSink;

impl EffectsSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn deliver(&self, event: CompletionEvent) -> BoxFuture<'static, anyhow::Result<()>> {
        info!(
            "Timer '{}' ({}) finished at {}",
            event.timer_name, event.timer_id, event.completed_at
        );
        Box::pin(future::ready(Ok(())))
    }
}
