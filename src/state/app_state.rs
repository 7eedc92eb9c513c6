//! Shared engine handle used by the HTTP layer and the background tasks

use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{CommitPolicy, CompletionEvent, Timer, TimerId, TimerStore};
use crate::error::Result;

/// Tunables for the scheduler and recovery drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// Cadence of the scheduler loop
    pub tick_interval: Duration,
    /// Minimum display change the scheduler loop will commit
    pub threshold_ms: u64,
    /// Wall-clock gap between ticks that counts as a resume from suspension
    pub wake_gap: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            threshold_ms: 10,
            wake_gap: Duration::from_secs(2),
        }
    }
}

/// Where a resume signal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeSource {
    /// SIGCONT delivered to the process
    Signal,
    /// The scheduler loop noticed it had not run for longer than the wake gap
    ClockGap,
    /// Raised explicitly through the HTTP API
    Api,
}

/// Engine state shared between the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// The timer collection, only touched through the methods below
    store: Mutex<TimerStore>,
    pub settings: EngineSettings,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Completion events for the effects sink
    pub completion_tx: broadcast::Sender<CompletionEvent>,
    /// Resume-from-suspension signals for the recovery handler
    pub resume_tx: broadcast::Sender<ResumeSource>,
    /// Latest committed snapshot of every timer
    pub snapshot_tx: watch::Sender<Vec<Timer>>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<Vec<Timer>>,
}

impl AppState {
    pub fn new(port: u16, host: String, settings: EngineSettings) -> Self {
        let (completion_tx, _) = broadcast::channel(100);
        let (resume_tx, _) = broadcast::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(Vec::new());

        Self {
            store: Mutex::new(TimerStore::new()),
            settings,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            completion_tx,
            resume_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Create `count` timers named "Timer 1".."Timer N"
    pub fn seed_timers(&self, count: usize) -> Result<Vec<Timer>> {
        (1..=count).map(|n| self.add(&format!("Timer {}", n))).collect()
    }

    fn store(&self) -> MutexGuard<'_, TimerStore> {
        // Every store mutation is a validated block of plain assignments, so a
        // panic elsewhere cannot leave a timer half-updated.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a store mutation, then record the action and publish a snapshot
    fn mutate<T, F>(&self, action: &str, updater: F) -> Result<T>
    where
        F: FnOnce(&mut TimerStore) -> Result<T>,
    {
        let mut store = self.store();
        let result = updater(&mut store)?;
        let snapshot = store.snapshot();
        drop(store); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.publish(snapshot);
        Ok(result)
    }

    fn publish(&self, snapshot: Vec<Timer>) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish timer snapshot: {}", e);
        }
    }

    pub fn add(&self, name: &str) -> Result<Timer> {
        self.mutate("add", |store| store.add(name))
    }

    pub fn delete(&self, id: TimerId) -> Option<Timer> {
        self.mutate("delete", |store| Ok(store.delete(id))).ok().flatten()
    }

    pub fn rename(&self, id: TimerId, name: &str) -> Result<Timer> {
        self.mutate("rename", |store| store.rename(id, name))
    }

    pub fn start(&self, id: TimerId, now: u64) -> Result<Timer> {
        self.mutate("start", |store| store.start(id, now))
    }

    /// Pause a timer. A countdown that already ran out completes instead, and
    /// its completion is broadcast like any other.
    pub fn pause(&self, id: TimerId, now: u64) -> Result<Timer> {
        let paused = self.mutate("pause", |store| store.pause(id, now))?;
        if let Some(event) = &paused.completion {
            self.announce(std::slice::from_ref(event));
        }
        Ok(paused.timer)
    }

    pub fn reset(&self, id: TimerId) -> Result<Timer> {
        self.mutate("reset", |store| store.reset(id))
    }

    pub fn zero(&self, id: TimerId) -> Result<Timer> {
        self.mutate("zero", |store| store.zero(id))
    }

    pub fn set_target_duration(&self, id: TimerId, minutes: f64) -> Result<Timer> {
        self.mutate("set-target", |store| store.set_target_duration(id, minutes))
    }

    pub fn apply_preset(&self, id: TimerId, ms: u64) -> Result<Timer> {
        self.mutate("preset", |store| store.apply_preset(id, ms))
    }

    pub fn toggle_mode(&self, id: TimerId) -> Result<Timer> {
        self.mutate("toggle-mode", |store| store.toggle_mode(id))
    }

    pub fn get(&self, id: TimerId) -> Result<Timer> {
        self.store().get(id)
    }

    pub fn snapshot(&self) -> Vec<Timer> {
        self.store().snapshot()
    }

    /// Regular scheduler step: commits only material display changes
    pub fn tick(&self, now: u64) -> Vec<CompletionEvent> {
        self.run_pass(now, CommitPolicy::Threshold(self.settings.threshold_ms))
    }

    /// Recovery step after a resume: commits every running timer unconditionally
    pub fn recover(&self, now: u64) -> Vec<CompletionEvent> {
        debug!("Running recovery pass at {}", now);
        self.run_pass(now, CommitPolicy::Always)
    }

    fn run_pass(&self, now: u64, policy: CommitPolicy) -> Vec<CompletionEvent> {
        let mut store = self.store();
        let pass = store.recompute(now, policy);
        let snapshot = pass.changed.then(|| store.snapshot());
        drop(store);

        if let Some(snapshot) = snapshot {
            self.publish(snapshot);
        }

        self.announce(&pass.completions);
        pass.completions
    }

    /// Broadcast completions. Callers commit state before anyone hears about it.
    fn announce(&self, completions: &[CompletionEvent]) {
        for event in completions {
            if let Err(e) = self.completion_tx.send(event.clone()) {
                warn!("No listener for completion of {}: {}", event.timer_name, e);
            }
        }
    }

    /// Raise a resume-from-suspension signal
    pub fn signal_resume(&self, source: ResumeSource) {
        info!("Resume signal raised ({:?})", source);
        if let Err(e) = self.resume_tx.send(source) {
            warn!("No recovery handler listening for resume signal: {}", e);
        }
    }

    pub fn subscribe_completions(&self) -> broadcast::Receiver<CompletionEvent> {
        self.completion_tx.subscribe()
    }

    pub fn subscribe_resume(&self) -> broadcast::Receiver<ResumeSource> {
        self.resume_tx.subscribe()
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Vec<Timer>> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
