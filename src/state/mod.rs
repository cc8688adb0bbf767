//! State management module
//!
//! The daemon's shared state and the countdown snapshot type.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::TimerState;
