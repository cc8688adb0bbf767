//! Error types for the sleep engine

use thiserror::Error;

/// Errors raised at the engine's configuration boundary.
///
/// All engine operations past this boundary are infallible state transitions,
/// so this is the only error the engine produces. Callers must fix the input
/// before retrying.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl EngineError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Validate a minute count coming from outside the engine
pub fn validate_minutes(minutes: i64) -> Result<u32, EngineError> {
    if minutes < 0 {
        return Err(EngineError::invalid(format!(
            "minutes must not be negative (got {})",
            minutes
        )));
    }
    u32::try_from(minutes)
        .map_err(|_| EngineError::invalid(format!("minutes out of range (got {})", minutes)))
}
