//! Events emitted by the countdown

use serde::{Deserialize, Serialize};

/// What caused a countdown cycle to start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmOrigin {
    /// Started by the user through `toggle_timer`
    Manual,
    /// Started by the daily scheduler
    Scheduled,
}

/// A countdown state change.
///
/// For one cycle observers always see `Activated`, then zero or more
/// `RemainingChanged` with strictly decreasing minutes, then exactly one
/// `Invalidated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    Activated { minutes: u32, origin: ArmOrigin },
    RemainingChanged { minutes: u32 },
    /// `completed` is true on natural expiry and false on cancellation
    Invalidated { completed: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_type_tag() {
        let json = serde_json::to_value(TimerEvent::Activated {
            minutes: 30,
            origin: ArmOrigin::Scheduled,
        })
        .unwrap();
        assert_eq!(json["type"], "activated");
        assert_eq!(json["minutes"], 30);
        assert_eq!(json["origin"], "scheduled");

        let json = serde_json::to_value(TimerEvent::Invalidated { completed: false }).unwrap();
        assert_eq!(json["type"], "invalidated");
        assert_eq!(json["completed"], false);
    }
}
