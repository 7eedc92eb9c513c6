//! State management module
//!
//! Timer entities, the pure time/completion functions, the owned timer store
//! and the shared handle the rest of the service talks to.

pub mod app_state;
pub mod clock;
pub mod store;
pub mod timer;

// Re-export main types
pub use app_state::{AppState, EngineSettings, ResumeSource};
pub use clock::{current_time, is_newly_complete, now_ms};
pub use store::{CommitPolicy, Paused, Recomputation, TimerStore, MAX_DURATION_MS};
pub use timer::{CompletionEvent, Timer, TimerId, TimerMode};
