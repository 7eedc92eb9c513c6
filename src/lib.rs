//! Bench Timers - Multi-timer stopwatch/countdown engine
//!
//! This library tracks independent stopwatch and countdown timers whose
//! displayed time stays correct even when the process is suspended or
//! throttled. Display values are always derived from wall-clock timestamps,
//! a scheduler loop refreshes them at a fixed cadence, and a recovery handler
//! takes a full pass whenever the host reports a resume.

pub mod api;
pub mod config;
pub mod effects;
pub mod error;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{Result, TimerError};
pub use state::{AppState, CompletionEvent, Timer, TimerId, TimerMode};
pub use utils::signals::shutdown_signal;
