//! Discrete-time deadline scheduling simulator.
//!
//! Models a single processing resource that advances in unit ticks and
//! serves one job per tick, and measures how many jobs a policy completes
//! before their deadlines.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `JobSpec`, `RunMetrics`
//! - **`dispatching`**: `SchedulingPolicy` and the FIFO, EDF and STR policies
//! - **`source`**: Bounded job sets, seeded generation, per-tick arrivals
//! - **`simulation`**: `SchedulingEngine`, `RunConfig`, policy comparison
//! - **`validation`**: Input integrity checks (duplicate IDs, sizes, deadlines)
//!
//! # Example
//!
//! ```
//! use u_deadline::dispatching::PolicyKind;
//! use u_deadline::simulation::compare_policies;
//! use u_deadline::simulation::RunConfig;
//! use u_deadline::source::JobGenerator;
//!
//! let jobs = JobGenerator::default().with_seed(1).generate().unwrap();
//! let runs = compare_policies(RunConfig::new(PolicyKind::Fifo), &jobs).unwrap();
//! for metrics in &runs {
//!     assert!(metrics.is_conserved());
//! }
//! ```
//!
//! # References
//!
//! - Liu & Layland (1973), "Scheduling Algorithms for Multiprogramming in
//!   a Hard-Real-Time Environment"
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5

pub mod dispatching;
pub mod error;
pub mod models;
pub mod simulation;
pub mod source;
pub mod validation;

pub use error::{Result, SimulationError};
