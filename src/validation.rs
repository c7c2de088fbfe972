//! Input validation for job sets.
//!
//! Checks structural integrity of job specs before a run starts.
//! Detects:
//! - Duplicate IDs
//! - Non-positive sizes
//! - Deadlines that do not fall after the start tick
//!
//! All problems are collected rather than stopping at the first one, so
//! a caller can report a broken job set in a single pass.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::JobSpec;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Two jobs share the same explicit ID.
    DuplicateId,
    /// A job requires zero work.
    NonPositiveSize,
    /// `deadline <= start`: the job can never be served.
    DeadlineNotAfterStart,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a single job spec.
///
/// `position` is used to name jobs without an explicit id.
/// Unschedulable jobs (`deadline <= start`) are accepted when
/// `allow_unschedulable` is set; they expire without ever being served.
pub fn validate_job(spec: &JobSpec, position: usize, allow_unschedulable: bool) -> ValidationResult {
    let mut errors = Vec::new();
    check_job(spec, position, allow_unschedulable, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a bounded job set.
///
/// Checks:
/// 1. No duplicate explicit job IDs
/// 2. Every job has `size > 0`
/// 3. Every job has `deadline > start` (unless `allow_unschedulable`)
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_jobs(specs: &[JobSpec], allow_unschedulable: bool) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for (position, spec) in specs.iter().enumerate() {
        if let Some(id) = spec.id {
            if !ids.insert(id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate job ID: {id}"),
                ));
            }
        }
        check_job(spec, position, allow_unschedulable, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_job(
    spec: &JobSpec,
    position: usize,
    allow_unschedulable: bool,
    errors: &mut Vec<ValidationError>,
) {
    let label = match spec.id {
        Some(id) => format!("Job {id}"),
        None => format!("Job at position {position}"),
    };

    if spec.size == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveSize,
            format!("{label} has non-positive size"),
        ));
    }

    if spec.is_unschedulable() && !allow_unschedulable {
        errors.push(ValidationError::new(
            ValidationErrorKind::DeadlineNotAfterStart,
            format!(
                "{label} has deadline {} not after start {}",
                spec.deadline, spec.start
            ),
        ));
    }
}
