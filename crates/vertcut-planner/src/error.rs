//! Planner error types.

use thiserror::Error;

use vertcut_models::PlanValidationError;

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Errors from crop-plan generation.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// The model call itself failed (network, quota, malformed request).
    #[error("plan generation failed: {0}")]
    Generation(String),

    /// The model's response could not be decoded into crop segments.
    #[error("plan validation failed: {0}")]
    Validation(String),

    /// The decoded segments violate plan invariants even after repair.
    #[error("plan invariants violated: {0}")]
    Invariants(#[from] PlanValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
