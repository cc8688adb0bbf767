//! Daemon state shared by the HTTP handlers and background tasks

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::TimerState;
use crate::engine::{
    ArmPlan, CountdownTimer, DailyScheduler, SetOutcome, SleepSettings, TimerObserver, Toggle,
};

/// Main application state: the engine plus daemon bookkeeping
pub struct AppState {
    /// The process-wide countdown, used for commands
    pub timer: Arc<CountdownTimer>,
    /// Read side of `timer`, used for status
    pub observer: TimerObserver,
    /// Daily auto-sleep scheduler driving `timer`
    pub scheduler: Arc<DailyScheduler>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Failures of the sleep or notification capabilities, for client visibility
    pub errors: Mutex<Vec<String>>,
}

impl AppState {
    pub fn new(
        timer: Arc<CountdownTimer>,
        scheduler: Arc<DailyScheduler>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            observer: timer.observer(),
            timer,
            scheduler,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            errors: Mutex::new(Vec::new()),
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Toggle the countdown
    pub fn toggle_timer(&self) -> Toggle {
        let outcome = self.timer.toggle_timer();
        match outcome {
            Toggle::Started => self.record_action("timer-start"),
            Toggle::Cancelled => self.record_action("timer-toggle-off"),
            Toggle::Ignored => {}
        }
        outcome
    }

    /// Set the countdown duration
    pub fn set_timer(&self, minutes: u32) -> SetOutcome {
        let outcome = self.timer.set(minutes);
        if outcome == SetOutcome::Applied {
            info!("Countdown set to {} minutes", minutes);
            self.record_action("timer-set");
        }
        outcome
    }

    /// Cancel a running countdown, returning whether one was running
    pub fn stop_timer(&self) -> bool {
        let stopped = self.timer.stop_timer(false);
        if stopped {
            self.record_action("timer-stop");
        }
        stopped
    }

    /// Replace the daily schedule
    pub fn configure_schedule(&self, settings: SleepSettings) -> Option<ArmPlan> {
        info!(
            "Applying schedule: auto_sleep={}, target={}, default={}min",
            settings.auto_sleep_enabled, settings.target, settings.default_manual_minutes
        );
        let plan = self.scheduler.configure(settings);
        self.record_action("schedule");
        plan
    }

    pub fn get_timer_state(&self) -> TimerState {
        self.observer.state()
    }

    /// Add an error to the state
    pub fn add_error(&self, error: String) {
        warn!("Adding error to state: {}", error);
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error);
        }
    }

    pub fn get_errors(&self) -> Vec<String> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Stop everything that could still put the machine to sleep
    pub fn shutdown(&self) {
        self.scheduler.cancel();
        if self.timer.stop_timer(false) {
            info!("Running countdown cancelled on shutdown");
        }
    }
}
