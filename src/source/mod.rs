//! Job sources.
//!
//! A run consumes jobs in one of two ways:
//!
//! - **Bounded**: a fixed sequence known before the first tick, either
//!   supplied by the caller or materialized by a [`JobGenerator`].
//! - **Streaming**: an [`ArrivalProcess`] consulted once per tick.
//!
//! Sources hand out specs by value; the engine builds its own jobs from
//! them, so one job set can feed any number of independent runs.

mod arrivals;
mod generator;

pub use arrivals::{ArrivalProcess, StochasticArrivals};
pub use generator::{DeadlineMode, JobGenerator};

pub(crate) use arrivals::validate_probability;

use std::fmt;

use crate::models::JobSpec;

/// Where a run's jobs come from.
pub enum JobSource {
    /// Caller-supplied job set.
    Bounded(Vec<JobSpec>),
    /// Generated job set (bounded mode) or Bernoulli arrivals using the
    /// run's arrival probability (streaming mode).
    Generated(JobGenerator),
    /// Caller-supplied arrival process.
    Arrivals(Box<dyn ArrivalProcess>),
}

impl JobSource {
    /// Copies `specs` into a bounded source.
    pub fn bounded(specs: &[JobSpec]) -> Self {
        JobSource::Bounded(specs.to_vec())
    }

    pub fn generated(generator: JobGenerator) -> Self {
        JobSource::Generated(generator)
    }

    pub fn arrivals(process: impl ArrivalProcess + 'static) -> Self {
        JobSource::Arrivals(Box::new(process))
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            JobSource::Bounded(_) => "bounded",
            JobSource::Generated(_) => "generated",
            JobSource::Arrivals(_) => "arrivals",
        }
    }
}

impl fmt::Debug for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSource::Bounded(specs) => f.debug_tuple("Bounded").field(&specs.len()).finish(),
            JobSource::Generated(generator) => f.debug_tuple("Generated").field(generator).finish(),
            JobSource::Arrivals(_) => f.write_str("Arrivals(..)"),
        }
    }
}
