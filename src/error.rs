//! Error types for the timer engine

use thiserror::Error;

use crate::state::TimerId;

/// Failures reported synchronously by the mutation API.
///
/// A failed operation never leaves a timer partially mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Caller supplied a value the engine cannot accept (empty name, non-positive duration)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The request is well-formed but not allowed in the timer's current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Timer not found: {0}")]
    NotFound(TimerId),
}

pub type Result<T> = std::result::Result<T, TimerError>;
