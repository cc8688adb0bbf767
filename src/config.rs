//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{
    engine::{recurrence::validate_lead_minutes, SleepSettings, TimeOfDay, DEFAULT_LEAD_MINUTES},
    error::{validate_minutes, EngineError},
    tasks::DEFAULT_WARN_AT_MINUTES,
};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "sleep-with-me")]
#[command(about = "Puts the machine to sleep after a countdown or at a daily time")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default manual countdown duration in minutes
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub timer: i64,

    /// Put the machine to sleep every day at --sleep-time
    #[arg(short, long)]
    pub auto_sleep: bool,

    /// Daily sleep time (HH:MM, local time)
    #[arg(short, long, default_value = "00:00")]
    pub sleep_time: String,

    /// Minutes before the daily sleep time at which the countdown is armed
    #[arg(long, default_value_t = DEFAULT_LEAD_MINUTES)]
    pub lead: u32,

    /// Warn the user when this many minutes are left
    #[arg(long, default_value_t = DEFAULT_WARN_AT_MINUTES)]
    pub warn_at: u32,

    /// Length of one countdown minute in seconds (for testing setups)
    #[arg(long, default_value = "60", hide = true)]
    pub tick_seconds: u64,

    /// Log notifications and sleep instead of executing them
    #[arg(long)]
    pub dry_run: bool,

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

    /// Settings snapshot for the scheduler
    pub fn sleep_settings(&self) -> Result<SleepSettings, EngineError> {
        Ok(SleepSettings {
            auto_sleep_enabled: self.auto_sleep,
            target: self.sleep_time.parse::<TimeOfDay>()?,
            default_manual_minutes: validate_minutes(self.timer)?,
        })
    }

    pub fn lead_minutes(&self) -> Result<u32, EngineError> {
        validate_lead_minutes(self.lead)
    }

    /// Interval between two countdown ticks
    pub fn tick_interval(&self) -> Result<Duration, EngineError> {
        if self.tick_seconds == 0 {
            return Err(EngineError::invalid("tick interval must be at least one second"));
        }
        Ok(Duration::from_secs(self.tick_seconds))
    }
}
