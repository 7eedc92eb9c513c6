//! Timer entity and completion event

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque timer identifier, assigned once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(Uuid);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for TimerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Stopwatch,
    Countdown,
}

/// One user-visible timer.
///
/// While running, `started_at` (stopwatch) or `end_time` (countdown) is the
/// source of truth and `display_time_ms` is only a cached projection of it.
/// All timestamps are wall-clock epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    pub mode: TimerMode,
    pub display_time_ms: u64,
    pub target_duration_ms: u64,
    pub is_running: bool,
    pub has_completed: bool,
    pub started_at: Option<u64>,
    pub end_time: Option<u64>,
    pub accumulated_time_ms: u64,
}

impl Timer {
    /// Create an idle stopwatch with every time field zeroed
    pub fn new(name: String) -> Self {
        Self {
            id: TimerId::new(),
            name,
            mode: TimerMode::Stopwatch,
            display_time_ms: 0,
            target_duration_ms: 0,
            is_running: false,
            has_completed: false,
            started_at: None,
            end_time: None,
            accumulated_time_ms: 0,
        }
    }

    pub fn is_countdown(&self) -> bool {
        self.mode == TimerMode::Countdown
    }

    /// Drop back to a non-running state, clearing run-segment bookkeeping.
    /// Callers set `display_time_ms` themselves.
    pub(crate) fn stop(&mut self) {
        self.is_running = false;
        self.has_completed = false;
        self.started_at = None;
        self.end_time = None;
    }
}

/// Emitted exactly once per completed countdown run segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionEvent {
    pub timer_id: TimerId,
    pub timer_name: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletionEvent {
    pub fn for_timer(timer: &Timer, now_ms: u64) -> Self {
        let completed_at = DateTime::<Utc>::from_timestamp_millis(now_ms as i64).unwrap_or_else(Utc::now);
        Self {
            timer_id: timer.id,
            timer_name: timer.name.clone(),
            completed_at,
        }
    }
}
