//! Sleep With Me - puts the machine to sleep after a countdown
//!
//! The engine (`engine`) owns the countdown state machine and the daily
//! auto-sleep scheduler. The rest of the crate is the daemon that owns the
//! engine: an HTTP control surface, background tasks reacting to countdown
//! events, and the system capabilities they invoke.

pub mod config;
pub mod engine;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{CountdownTimer, DailyScheduler, SleepSettings, TimerEvent};
pub use error::EngineError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
