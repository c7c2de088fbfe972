//! Run metrics.
//!
//! The result record of one simulation run, handed back to the caller
//! once the run terminates.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Ticks elapsed | Clock value at termination |
//! | Admitted | Jobs that entered the engine |
//! | Completed | Jobs whose work finished before their deadline |
//! | Expired | Jobs dropped at their deadline |
//! | Pending | Jobs neither completed nor expired at termination |
//! | Preemptions | Times an active job was displaced |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Tick;
use crate::dispatching::PolicyKind;

/// Simulation mode a run was executed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Bounded,
    Streaming,
}

/// Outcome of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Policy that produced the run.
    pub policy: PolicyKind,
    /// Mode the run was executed in.
    pub mode: ModeKind,
    /// Ticks simulated before termination.
    pub ticks_elapsed: Tick,
    /// Jobs that entered the engine.
    pub jobs_admitted: u64,
    /// Jobs completed before their deadline.
    pub jobs_completed: u64,
    /// Jobs discarded at their deadline.
    pub jobs_expired: u64,
    /// Jobs still pooled or active when the run stopped.
    pub jobs_pending: u64,
    /// Number of preemptions performed.
    pub preemptions: u64,
    /// Host time spent in the tick loop.
    pub wall_time: Duration,
}

impl RunMetrics {
    /// Wall time in fractional seconds.
    pub fn wall_time_seconds(&self) -> f64 {
        self.wall_time.as_secs_f64()
    }

    /// Every admitted job is accounted for exactly once.
    pub fn is_conserved(&self) -> bool {
        self.jobs_completed + self.jobs_expired + self.jobs_pending == self.jobs_admitted
    }

    /// Fraction of admitted jobs that completed (0.0..1.0).
    ///
    /// A run that admitted nothing reports 1.0.
    pub fn completion_rate(&self) -> f64 {
        if self.jobs_admitted == 0 {
            1.0
        } else {
            self.jobs_completed as f64 / self.jobs_admitted as f64
        }
    }
}
