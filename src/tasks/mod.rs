//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod sleep_guard;
pub mod wake_up_recovery;

// Re-export main functions
pub use sleep_guard::{sleep_guard_task, DEFAULT_WARN_AT_MINUTES};
pub use wake_up_recovery::wake_up_recovery_task;
