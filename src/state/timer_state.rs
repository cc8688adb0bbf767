//! Countdown snapshot published to observers

use serde::{Deserialize, Serialize};

use crate::engine::ArmOrigin;

/// Point-in-time view of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub running: bool,
    pub total_minutes: u32,
    pub remaining_minutes: u32,
    /// Who armed the current (or last) cycle
    pub origin: Option<ArmOrigin>,
}

impl TimerState {
    /// Create a stopped, unset timer state
    pub fn new() -> Self {
        Self {
            running: false,
            total_minutes: 0,
            remaining_minutes: 0,
            origin: None,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
