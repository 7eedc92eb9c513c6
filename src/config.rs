//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::state::EngineSettings;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "bench-timers")]
#[command(about = "Multi-timer stopwatch/countdown service that survives suspension")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Scheduler loop cadence in milliseconds
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Minimum display change (ms) committed by a regular tick
    #[arg(long, default_value = "10")]
    pub threshold_ms: u64,

    /// Gap between ticks (seconds) treated as a resume from suspension
    #[arg(long, default_value = "2")]
    pub wake_gap_secs: u64,

    /// Number of timers created at startup
    #[arg(long, default_value = "1")]
    pub initial_timers: usize,

    /// Command to run when a countdown finishes
    #[arg(long)]
    pub alarm_command: Option<String>,

    /// Post a desktop notification via notify-send when a countdown finishes
    #[arg(long)]
    pub notify: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn wake_gap(&self) -> Duration {
        Duration::from_secs(self.wake_gap_secs)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            tick_interval: self.tick_interval(),
            threshold_ms: self.threshold_ms,
            wake_gap: self.wake_gap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_engine_defaults() {
        let config = Config::try_parse_from(["bench-timers"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.engine_settings(), EngineSettings::default());
        assert_eq!(config.initial_timers, 1);
    }

    #[test]
    fn parses_overrides() {
        let config = Config::try_parse_from([
            "bench-timers",
            "--tick-ms",
            "16",
            "--wake-gap-secs",
            "5",
            "--alarm-command",
            "paplay bell.oga",
            "-v",
        ])
        .unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.wake_gap(), Duration::from_secs(5));
        assert_eq!(config.alarm_command.as_deref(), Some("paplay bell.oga"));
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn rejects_zero_tick() {
        assert!(Config::try_parse_from(["bench-timers", "--tick-ms", "0"]).is_err());
    }
}
