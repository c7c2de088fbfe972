//! Job model.
//!
//! A job is a unit of work that needs `size` ticks of service on the single
//! processing resource, may not be served before `start`, and is dropped
//! once the clock reaches `deadline`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Discrete simulation time.
pub type Tick = u64;

/// Job identifier, unique within a run.
pub type JobId = u64;

/// Caller-facing job description.
///
/// The engine turns specs into [`Job`]s at run start, so the same slice of
/// specs can be handed to any number of independent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Explicit identifier. `None` = assigned by the engine.
    pub id: Option<JobId>,
    /// Work units required to complete.
    pub size: u64,
    /// Earliest tick at which the job may be served.
    pub start: Tick,
    /// Tick at which the job fails if still incomplete.
    pub deadline: Tick,
}

impl JobSpec {
    /// Creates a spec without an explicit id.
    pub fn new(size: u64, start: Tick, deadline: Tick) -> Self {
        Self {
            id: None,
            size,
            start,
            deadline,
        }
    }

    /// Sets the job id.
    pub fn with_id(mut self, id: JobId) -> Self {
        self.id = Some(id);
        self
    }

    /// Whether the deadline leaves no tick in which the job could be served.
    pub fn is_unschedulable(&self) -> bool {
        self.deadline <= self.start
    }
}

/// A job owned by a running engine.
///
/// # Invariants
/// `completed <= size` at all times; `completed` only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub size: u64,
    pub completed: u64,
    pub start: Tick,
    pub deadline: Tick,
}

impl Job {
    /// Creates a fresh job with no work applied.
    pub fn new(id: JobId, size: u64, start: Tick, deadline: Tick) -> Self {
        Self {
            id,
            size,
            completed: 0,
            start,
            deadline,
        }
    }

    /// Snapshots a spec, falling back to `fallback_id` when the spec has none.
    pub fn from_spec(spec: &JobSpec, fallback_id: JobId) -> Self {
        Self::new(
            spec.id.unwrap_or(fallback_id),
            spec.size,
            spec.start,
            spec.deadline,
        )
    }

    /// Work units still outstanding.
    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.completed)
    }

    /// Ready at `now`: started and not yet complete.
    pub fn is_ready(&self, now: Tick) -> bool {
        self.start <= now && self.completed < self.size
    }

    /// Expired at `now`: the deadline has been reached.
    pub fn is_expired(&self, now: Tick) -> bool {
        self.deadline <= now
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.size
    }

    /// Applies exactly one unit of work.
    ///
    /// Returns an invariant violation instead of overshooting `size`.
    pub fn apply_work(&mut self) -> Result<()> {
        if self.completed >= self.size {
            return Err(SimulationError::InvariantViolation(format!(
                "job {} received work beyond its size ({}/{})",
                self.id, self.completed, self.size
            )));
        }
        self.completed += 1;
        Ok(())
    }
}
