//! Completion effects module
//!
//! The engine only decides when a countdown finished; sounding an alarm or
//! posting a desktop notification happens behind the `EffectsSink` trait.

pub mod command;
pub mod sink;

// Re-export main types
pub use command::CommandSink;
pub use sink::{EffectsSink, LogSink};
