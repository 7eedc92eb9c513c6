//! Background tasks module
//!
//! The scheduler loop and the recovery handler are two independent drivers of
//! the same recomputation step; the effects task forwards completions outward.

pub mod effects;
pub mod recovery;
pub mod scheduler_loop;

// Re-export main functions
pub use effects::{dispatch_completions, effects_task};
pub use recovery::{handle_resumes, recovery_task};
pub use scheduler_loop::{is_wake_gap, scheduler_loop_task};
