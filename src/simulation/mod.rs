//! Simulation runs.
//!
//! Provides the tick-driven [`SchedulingEngine`], its run configuration,
//! and helpers that compare all built-in policies over one workload.
//!
//! # Determinism
//!
//! A run is a pure function of its configuration and job source: the
//! same job set, or the same seeded generator, always yields the same
//! metrics (wall time aside). Runs share no state.

mod comparison;
mod config;
mod engine;

pub use comparison::{compare_policies, ComparisonReport, ComparisonRow};
pub use config::{RunConfig, RunMode};
pub use engine::{simulate, SchedulingEngine, TickEvent};
