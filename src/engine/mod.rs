//! Sleep scheduling engine
//!
//! The countdown state machine, its events, and the daily scheduler that
//! arms it. Nothing in here touches the system: the owner reacts to events.

pub mod clock;
pub mod countdown;
pub mod events;
pub mod recurrence;
pub mod scheduler;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{CountdownTimer, SetOutcome, TimerObserver, Toggle, DEFAULT_TICK_INTERVAL};
pub use events::{ArmOrigin, TimerEvent};
pub use recurrence::{next_occurrence, plan, ArmPlan, TimeOfDay, DEFAULT_LEAD_MINUTES};
pub use scheduler::{DailyScheduler, SleepSettings};
