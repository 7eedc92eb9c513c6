//! Scheduler loop background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::{now_ms, AppState, ResumeSource};

/// Background task that recomputes every running timer at a fixed cadence
pub async fn scheduler_loop_task(state: Arc<AppState>) {
    info!(
        "Starting scheduler loop (tick={:?}, threshold={}ms)",
        state.settings.tick_interval, state.settings.threshold_ms
    );

    let mut interval = interval(state.settings.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_tick: Option<u64> = None;

    loop {
        interval.tick().await;
        let now = now_ms();

        // A long silence between ticks means the process was frozen or the
        // host slept; let the recovery handler take a full pass.
        if let Some(previous) = last_tick {
            if is_wake_gap(previous, now, state.settings.wake_gap) {
                info!("Scheduler loop stalled for {}ms, raising resume", now.saturating_sub(previous));
                state.signal_resume(ResumeSource::ClockGap);
            }
        }
        last_tick = Some(now);

        let completions = state.tick(now);
        if !completions.is_empty() {
            debug!("Tick at {} completed {} timer(s)", now, completions.len());
        }
    }
}

/// Whether the wall clock moved further than `gap` between two ticks
pub fn is_wake_gap(previous: u64, now: u64, gap: Duration) -> bool {
    now.saturating_sub(previous) > gap.as_millis() as u64
}
