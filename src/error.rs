//! Error types for simulation setup and execution.
//!
//! Deadline misses are not errors: an expired job is a normal simulation
//! outcome and only shows up as a missing completion in [`RunMetrics`].
//!
//! [`RunMetrics`]: crate::models::RunMetrics

use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("invalid job set: {}", join_messages(.0))]
    InvalidJobs(Vec<ValidationError>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported policy: {0}")]
    UnsupportedPolicy(String),

    #[error("unsupported mode: {0}")]
    UnsupportedMode(String),

    #[error("{mode} mode does not accept job source `{source_kind}`")]
    ModeMismatch {
        mode: &'static str,
        source_kind: &'static str,
    },

    /// Engine or policy bug; the run is aborted.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
