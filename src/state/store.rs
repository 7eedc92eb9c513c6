//! Owned timer collection and lifecycle operations

use tracing::{debug, info};

use super::{
    clock::{current_time, is_newly_complete, mark_completed},
    timer::{CompletionEvent, Timer, TimerId, TimerMode},
};
use crate::error::{Result, TimerError};

/// Longest duration a timer may be set to (100 days)
pub const MAX_DURATION_MS: u64 = 100 * 24 * 60 * 60 * 1000;

/// How a recomputation pass commits recomputed display values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPolicy {
    /// Commit only when the value moved by at least this many milliseconds
    Threshold(u64),
    /// Commit every recomputed value
    Always,
}

/// Outcome of one recomputation pass over all running timers
#[derive(Debug, Default)]
pub struct Recomputation {
    pub completions: Vec<CompletionEvent>,
    /// Whether any timer field was committed during the pass
    pub changed: bool,
}

/// Result of pausing a timer.
///
/// A countdown that already ran out before the pause was handled completes
/// instead of pausing, and carries its completion event.
#[derive(Debug)]
pub struct Paused {
    pub timer: Timer,
    pub completion: Option<CompletionEvent>,
}

/// Single source of truth for every timer.
///
/// Timers live in insertion order and are addressed by id; nothing outside
/// this type mutates timer fields.
#[derive(Debug, Default)]
pub struct TimerStore {
    timers: Vec<Timer>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self { timers: Vec::new() }
    }

    pub fn snapshot(&self) -> Vec<Timer> {
        self.timers.clone()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn get(&self, id: TimerId) -> Result<Timer> {
        self.timers
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TimerError::NotFound(id))
    }

    fn get_mut(&mut self, id: TimerId) -> Result<&mut Timer> {
        self.timers
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TimerError::NotFound(id))
    }

    pub fn add(&mut self, name: &str) -> Result<Timer> {
        let name = validate_name(name)?;
        let timer = Timer::new(name);
        info!("Adding timer {} ({})", timer.name, timer.id);
        self.timers.push(timer.clone());
        Ok(timer)
    }

    /// Remove a timer. Unknown ids are ignored.
    pub fn delete(&mut self, id: TimerId) -> Option<Timer> {
        let index = self.timers.iter().position(|t| t.id == id)?;
        let removed = self.timers.remove(index);
        info!("Deleted timer {} ({})", removed.name, removed.id);
        Some(removed)
    }

    pub fn rename(&mut self, id: TimerId, name: &str) -> Result<Timer> {
        let name = validate_name(name)?;
        let timer = self.get_mut(id)?;
        timer.name = name;
        Ok(timer.clone())
    }

    pub fn start(&mut self, id: TimerId, now: u64) -> Result<Timer> {
        let timer = self.get_mut(id)?;
        if timer.is_running {
            return Ok(timer.clone());
        }
        if timer.is_countdown() && timer.target_duration_ms == 0 {
            return Err(TimerError::InvalidOperation("no target duration set".to_string()));
        }
        // A finished or zeroed countdown restarts from its target
        let display = if timer.is_countdown() && timer.display_time_ms == 0 {
            timer.target_duration_ms
        } else {
            timer.display_time_ms
        };

        let end_time = match timer.mode {
            TimerMode::Countdown => Some(now.checked_add(display).ok_or_else(|| {
                TimerError::InvalidOperation("countdown end time is out of range".to_string())
            })?),
            TimerMode::Stopwatch => None,
        };

        timer.display_time_ms = display;
        timer.is_running = true;
        timer.has_completed = false;
        timer.end_time = end_time;
        match timer.mode {
            TimerMode::Stopwatch => {
                timer.started_at = Some(now);
                timer.accumulated_time_ms = timer.display_time_ms;
            }
            TimerMode::Countdown => timer.started_at = None,
        }
        info!("Started timer {} at {}ms", timer.name, timer.display_time_ms);
        Ok(timer.clone())
    }

    pub fn pause(&mut self, id: TimerId, now: u64) -> Result<Paused> {
        let timer = self.get_mut(id)?;
        if !timer.is_running {
            return Ok(Paused { timer: timer.clone(), completion: None });
        }

        if is_newly_complete(timer, now) {
            mark_completed(timer);
            info!("Countdown {} ({}) ran out before pause", timer.name, timer.id);
            let completion = CompletionEvent::for_timer(timer, now);
            return Ok(Paused { timer: timer.clone(), completion: Some(completion) });
        }

        let elapsed = current_time(timer, now);
        timer.stop();
        timer.display_time_ms = elapsed;
        if timer.mode == TimerMode::Stopwatch {
            timer.accumulated_time_ms = elapsed;
        }
        info!("Paused timer {} at {}ms", timer.name, elapsed);
        Ok(Paused { timer: timer.clone(), completion: None })
    }

    /// Stop without committing elapsed time and return to the mode's origin
    pub fn reset(&mut self, id: TimerId) -> Result<Timer> {
        let timer = self.get_mut(id)?;
        timer.stop();
        timer.accumulated_time_ms = 0;
        timer.display_time_ms = match timer.mode {
            TimerMode::Countdown => timer.target_duration_ms,
            TimerMode::Stopwatch => 0,
        };
        info!("Reset timer {}", timer.name);
        Ok(timer.clone())
    }

    /// Force the display to zero regardless of mode
    pub fn zero(&mut self, id: TimerId) -> Result<Timer> {
        let timer = self.get_mut(id)?;
        timer.stop();
        timer.accumulated_time_ms = 0;
        timer.display_time_ms = 0;
        info!("Zeroed timer {}", timer.name);
        Ok(timer.clone())
    }

    pub fn set_target_duration(&mut self, id: TimerId, minutes: f64) -> Result<Timer> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(TimerError::InvalidInput(format!(
                "target duration must be a positive number of minutes, got {}",
                minutes
            )));
        }
        let target_ms = (minutes * 60_000.0).round();
        if target_ms < 1.0 {
            return Err(TimerError::InvalidInput(format!(
                "target duration of {} minutes rounds to zero",
                minutes
            )));
        }
        if target_ms > MAX_DURATION_MS as f64 {
            return Err(TimerError::InvalidInput(format!(
                "target duration of {} minutes exceeds the {}ms limit",
                minutes, MAX_DURATION_MS
            )));
        }
        let target_ms = target_ms as u64;

        let timer = self.get_mut(id)?;
        if !timer.is_countdown() {
            return Err(TimerError::InvalidOperation(
                "target duration applies to countdown timers only".to_string(),
            ));
        }

        timer.stop();
        timer.target_duration_ms = target_ms;
        timer.display_time_ms = target_ms;
        info!("Set target duration of {} to {}ms", timer.name, target_ms);
        Ok(timer.clone())
    }

    pub fn apply_preset(&mut self, id: TimerId, ms: u64) -> Result<Timer> {
        if ms == 0 {
            return Err(TimerError::InvalidInput("preset duration must be positive".to_string()));
        }
        if ms > MAX_DURATION_MS {
            return Err(TimerError::InvalidInput(format!(
                "preset of {}ms exceeds the {}ms limit",
                ms, MAX_DURATION_MS
            )));
        }

        let timer = self.get_mut(id)?;
        timer.stop();
        timer.display_time_ms = ms;
        match timer.mode {
            TimerMode::Countdown => timer.target_duration_ms = ms,
            TimerMode::Stopwatch => timer.accumulated_time_ms = ms,
        }
        info!("Applied {}ms preset to {}", ms, timer.name);
        Ok(timer.clone())
    }

    /// Switch mode. A running session never carries over.
    pub fn toggle_mode(&mut self, id: TimerId) -> Result<Timer> {
        let timer = self.get_mut(id)?;
        timer.stop();
        timer.accumulated_time_ms = 0;
        match timer.mode {
            TimerMode::Stopwatch => {
                timer.mode = TimerMode::Countdown;
                timer.display_time_ms = timer.target_duration_ms;
            }
            TimerMode::Countdown => {
                timer.mode = TimerMode::Stopwatch;
                timer.display_time_ms = 0;
            }
        }
        info!("Timer {} switched to {:?}", timer.name, timer.mode);
        Ok(timer.clone())
    }

    /// Recompute every running timer at `now`.
    ///
    /// Completion is checked and committed in the same step, so a second pass
    /// over an already completed segment finds `has_completed` set and emits
    /// nothing.
    pub fn recompute(&mut self, now: u64, policy: CommitPolicy) -> Recomputation {
        let mut pass = Recomputation::default();

        for timer in self.timers.iter_mut().filter(|t| t.is_running) {
            let value = current_time(timer, now);

            if is_newly_complete(timer, now) {
                mark_completed(timer);
                info!("Countdown {} ({}) completed", timer.name, timer.id);
                pass.completions.push(CompletionEvent::for_timer(timer, now));
                pass.changed = true;
                continue;
            }

            let material = match policy {
                CommitPolicy::Always => value != timer.display_time_ms,
                CommitPolicy::Threshold(threshold) => value.abs_diff(timer.display_time_ms) >= threshold,
            };
            if material {
                timer.display_time_ms = value;
                pass.changed = true;
            }
        }

        if !pass.completions.is_empty() {
            debug!("Recompute pass at {} produced {} completion(s)", now, pass.completions.len());
        }
        pass
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(TimerError::InvalidInput("timer name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_timer() -> (TimerStore, TimerId) {
        let mut store = TimerStore::new();
        let id = store.add("Timer 1").unwrap().id;
        (store, id)
    }

    fn countdown(store: &mut TimerStore, id: TimerId, minutes: f64) {
        store.toggle_mode(id).unwrap();
        store.set_target_duration(id, minutes).unwrap();
    }

    #[test]
    fn add_rejects_blank_names() {
        let mut store = TimerStore::new();
        assert!(matches!(store.add("   "), Err(TimerError::InvalidInput(_))));
        assert!(store.is_empty());
        assert_eq!(store.add("  Reflux ").unwrap().name, "Reflux");
    }

    #[test]
    fn delete_unknown_is_noop() {
        let (mut store, _) = store_with_timer();
        assert!(store.delete(TimerId::new()).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut store = TimerStore::new();
        let id = TimerId::new();
        assert_eq!(store.start(id, 0), Err(TimerError::NotFound(id)));
    }

    #[test]
    fn pause_resume_round_trip() {
        let (mut store, id) = store_with_timer();
        store.start(id, 0).unwrap();
        let paused = store.pause(id, 500).unwrap().timer;
        assert_eq!(paused.display_time_ms, 500);
        assert_eq!(paused.accumulated_time_ms, 500);

        let resumed = store.start(id, 700).unwrap();
        assert_eq!(current_time(&resumed, 900), 700);
    }

    #[test]
    fn start_twice_keeps_original_segment() {
        let (mut store, id) = store_with_timer();
        store.start(id, 100).unwrap();
        let again = store.start(id, 5_000).unwrap();
        assert_eq!(again.started_at, Some(100));
    }

    #[test]
    fn countdown_without_target_cannot_start() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        let err = store.start(id, 0).unwrap_err();
        assert!(matches!(err, TimerError::InvalidOperation(_)));
        assert!(!store.get(id).unwrap().is_running);
    }

    #[test]
    fn countdown_start_sets_end_time() {
        let (mut store, id) = store_with_timer();
        countdown(&mut store, id, 1.0);
        let timer = store.start(id, 1_000).unwrap();
        assert_eq!(timer.end_time, Some(61_000));
        assert!(timer.started_at.is_none());
    }

    #[test]
    fn reset_returns_countdown_to_target() {
        let (mut store, id) = store_with_timer();
        countdown(&mut store, id, 0.5);
        store.start(id, 0).unwrap();
        store.pause(id, 10_000).unwrap();
        let timer = store.reset(id).unwrap();
        assert_eq!(timer.display_time_ms, 30_000);
        assert!(!timer.is_running);
    }

    #[test]
    fn pause_after_expiry_completes_instead() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        store.apply_preset(id, 5_000).unwrap();
        store.start(id, 0).unwrap();

        let paused = store.pause(id, 10_000).unwrap();
        let event = paused.completion.expect("expired countdown should complete");
        assert_eq!(event.timer_id, id);
        assert!(paused.timer.has_completed);
        assert!(!paused.timer.is_running);
        assert_eq!(paused.timer.display_time_ms, 0);
        assert!(store.recompute(10_001, CommitPolicy::Always).completions.is_empty());
    }

    #[test]
    fn pause_before_expiry_keeps_remaining_time() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        store.apply_preset(id, 5_000).unwrap();
        store.start(id, 0).unwrap();

        let paused = store.pause(id, 4_000).unwrap();
        assert!(paused.completion.is_none());
        assert_eq!(paused.timer.display_time_ms, 1_000);
        assert!(!paused.timer.has_completed);
    }

    #[test]
    fn zeroed_countdown_restarts_from_target() {
        let (mut store, id) = store_with_timer();
        countdown(&mut store, id, 1.0);
        store.zero(id).unwrap();

        let timer = store.start(id, 1_000).unwrap();
        assert!(timer.is_running);
        assert_eq!(timer.display_time_ms, 60_000);
        assert_eq!(timer.end_time, Some(61_000));
        assert!(store.recompute(1_000, CommitPolicy::Always).completions.is_empty());
    }

    #[test]
    fn oversized_durations_are_rejected() {
        let (mut store, id) = store_with_timer();
        assert!(matches!(store.apply_preset(id, u64::MAX - 10), Err(TimerError::InvalidInput(_))));

        store.toggle_mode(id).unwrap();
        assert!(matches!(store.apply_preset(id, u64::MAX), Err(TimerError::InvalidInput(_))));
        assert!(matches!(store.set_target_duration(id, 1e300), Err(TimerError::InvalidInput(_))));
        assert!(matches!(
            store.apply_preset(id, MAX_DURATION_MS + 1),
            Err(TimerError::InvalidInput(_))
        ));

        let timer = store.get(id).unwrap();
        assert_eq!(timer.target_duration_ms, 0);
        assert!(!timer.is_running);
    }

    #[test]
    fn longest_duration_starts_and_ticks() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        store.apply_preset(id, MAX_DURATION_MS).unwrap();
        let timer = store.start(id, 1_700_000_000_000).unwrap();
        assert_eq!(timer.end_time, Some(1_700_000_000_000 + MAX_DURATION_MS));
        assert!(store.recompute(1_700_000_001_000, CommitPolicy::Always).changed);
    }

    #[test]
    fn start_out_of_range_leaves_timer_stopped() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        store.apply_preset(id, 1_000).unwrap();

        let err = store.start(id, u64::MAX - 10).unwrap_err();
        assert!(matches!(err, TimerError::InvalidOperation(_)));
        let timer = store.get(id).unwrap();
        assert!(!timer.is_running);
        assert!(timer.end_time.is_none() && timer.started_at.is_none());
    }

    #[test]
    fn zero_ignores_target() {
        let (mut store, id) = store_with_timer();
        countdown(&mut store, id, 2.0);
        let timer = store.zero(id).unwrap();
        assert_eq!(timer.display_time_ms, 0);
        assert_eq!(timer.target_duration_ms, 120_000);
    }

    #[test]
    fn target_duration_validation() {
        let (mut store, id) = store_with_timer();
        assert!(matches!(store.set_target_duration(id, 1.0), Err(TimerError::InvalidOperation(_))));

        store.toggle_mode(id).unwrap();
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(store.set_target_duration(id, bad), Err(TimerError::InvalidInput(_))));
        }
        assert_eq!(store.get(id).unwrap().target_duration_ms, 0);
    }

    #[test]
    fn target_duration_stops_running_countdown() {
        let (mut store, id) = store_with_timer();
        countdown(&mut store, id, 1.0);
        store.start(id, 0).unwrap();
        let timer = store.set_target_duration(id, 3.0).unwrap();
        assert!(!timer.is_running);
        assert!(timer.end_time.is_none());
        assert_eq!(timer.display_time_ms, 180_000);
    }

    #[test]
    fn preset_on_countdown_updates_target() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        let timer = store.apply_preset(id, 90_000).unwrap();
        assert_eq!(timer.target_duration_ms, 90_000);
        assert_eq!(timer.display_time_ms, 90_000);
        assert!(store.start(id, 0).is_ok());
    }

    #[test]
    fn preset_on_stopwatch_resumes_from_preset() {
        let (mut store, id) = store_with_timer();
        store.apply_preset(id, 5_000).unwrap();
        let timer = store.start(id, 0).unwrap();
        assert_eq!(current_time(&timer, 1_000), 6_000);
        assert_eq!(timer.target_duration_ms, 0);
    }

    #[test]
    fn toggle_clears_everything_from_any_state() {
        let (mut store, id) = store_with_timer();
        store.start(id, 0).unwrap();
        let timer = store.toggle_mode(id).unwrap();
        assert_eq!(timer.mode, TimerMode::Countdown);
        assert!(!timer.is_running && !timer.has_completed);
        assert!(timer.started_at.is_none() && timer.end_time.is_none());
        assert_eq!(timer.accumulated_time_ms, 0);

        store.apply_preset(id, 1_000).unwrap();
        store.start(id, 0).unwrap();
        store.recompute(1_000, CommitPolicy::Always);
        assert!(store.get(id).unwrap().has_completed);

        let timer = store.toggle_mode(id).unwrap();
        assert_eq!(timer.mode, TimerMode::Stopwatch);
        assert!(!timer.is_running && !timer.has_completed);
        assert_eq!(timer.display_time_ms, 0);
    }

    #[test]
    fn threshold_suppresses_small_moves() {
        let (mut store, id) = store_with_timer();
        store.start(id, 0).unwrap();

        let pass = store.recompute(5, CommitPolicy::Threshold(10));
        assert!(!pass.changed);
        assert_eq!(store.get(id).unwrap().display_time_ms, 0);

        let pass = store.recompute(12, CommitPolicy::Threshold(10));
        assert!(pass.changed);
        assert_eq!(store.get(id).unwrap().display_time_ms, 12);

        let pass = store.recompute(15, CommitPolicy::Always);
        assert!(pass.changed);
        assert_eq!(store.get(id).unwrap().display_time_ms, 15);
    }

    #[test]
    fn completion_commits_once() {
        let (mut store, id) = store_with_timer();
        store.toggle_mode(id).unwrap();
        store.apply_preset(id, 1_000).unwrap();
        store.start(id, 0).unwrap();

        assert!(store.recompute(999, CommitPolicy::Threshold(10)).completions.is_empty());
        let first = store.recompute(1_000, CommitPolicy::Threshold(10));
        let second = store.recompute(1_001, CommitPolicy::Always);
        assert_eq!(first.completions.len(), 1);
        assert_eq!(first.completions[0].timer_id, id);
        assert!(second.completions.is_empty());

        let timer = store.get(id).unwrap();
        assert!(timer.has_completed && !timer.is_running);
        assert_eq!(timer.display_time_ms, 0);
    }
}
