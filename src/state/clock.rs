//! Time derivation and completion detection
//!
//! Both functions are pure: they read a timer and a wall-clock instant and
//! never mutate anything, so any number of drivers may call them redundantly.
//!
//! The clock is wall-clock, not monotonic. A backward jump can make a
//! stopwatch reading dip or end a countdown early; that is accepted.

use chrono::Utc;

use super::timer::{Timer, TimerMode};

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Derive the value a timer should display at `now`.
///
/// Stopped timers return their committed value unchanged. A running
/// stopwatch is `accumulated + (now - started_at)`; a running countdown is
/// `end_time - now` floored at zero.
pub fn current_time(timer: &Timer, now: u64) -> u64 {
    if !timer.is_running {
        return timer.display_time_ms;
    }

    match timer.mode {
        TimerMode::Stopwatch => match timer.started_at {
            Some(started_at) => timer.accumulated_time_ms.saturating_add(now.saturating_sub(started_at)),
            None => timer.display_time_ms,
        },
        TimerMode::Countdown => match timer.end_time {
            Some(end_time) => end_time.saturating_sub(now),
            None => timer.display_time_ms,
        },
    }
}

/// True when a running countdown has reached zero and completion has not been
/// committed yet for this run segment.
pub fn is_newly_complete(timer: &Timer, now: u64) -> bool {
    if timer.mode != TimerMode::Countdown || !timer.is_running || timer.has_completed {
        return false;
    }
    match timer.end_time {
        Some(end_time) => current_time(timer, now) == 0 && now >= end_time,
        None => false,
    }
}

/// Apply the completion transition as a single commit
pub(crate) fn mark_completed(timer: &mut Timer) {
    timer.is_running = false;
    timer.has_completed = true;
    timer.started_at = None;
    timer.end_time = None;
    timer.display_time_ms = 0;
}
