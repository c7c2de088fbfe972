//! Simulation domain models.
//!
//! Provides the job record the engine mutates tick by tick, the input
//! spec callers build job sets from, and the metrics record a run returns.
//!
//! # Lifecycle
//!
//! | Stage | Owner | Representation |
//! |-------|-------|----------------|
//! | Described | Caller / generator | `JobSpec` |
//! | Pooled or active | `SchedulingEngine` | `Job` |
//! | Resolved | `RunMetrics` counters | completed / expired / pending |

mod job;
mod metrics;

pub use job::{Job, JobId, JobSpec, Tick};
pub use metrics::{ModeKind, RunMetrics};
