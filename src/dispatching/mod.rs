//! Scheduling policies for the single-resource engine.
//!
//! A policy answers two questions every tick: which ready job should take
//! an idle resource, and whether the job currently on the resource should
//! give way to a waiting one. Everything else (admission, expiry, work,
//! completion) is owned by the engine's tick loop.
//!
//! # Usage
//!
//! ```
//! use u_deadline::dispatching::{rules, PolicyKind, SchedulingPolicy};
//!
//! let policy = PolicyKind::Str.policy();
//! assert_eq!(policy.name(), "STR");
//! assert!(policy.is_preemptive());
//! assert!(!rules::Edf.is_preemptive());
//! ```

mod pool;
pub mod rules;

pub use pool::JobPool;

use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::models::{Job, Tick};

/// A single-resource scheduling policy.
///
/// # Pool Convention
/// The engine keeps its pool sorted by [`compare`](Self::compare), stable
/// with respect to insertion order. Index `0` is the nominal head.
pub trait SchedulingPolicy: Send + Sync + Debug {
    /// Policy name (e.g., "FIFO", "EDF").
    fn name(&self) -> &'static str;

    /// Order key including tie-breaks. `Less` = served earlier.
    fn compare(&self, a: &Job, b: &Job) -> Ordering;

    /// Whether an active job can be displaced before it finishes.
    fn is_preemptive(&self) -> bool {
        false
    }

    /// Picks a pool index to serve.
    ///
    /// With no active job this is the head when it is ready, otherwise the
    /// ready job with the smallest `start`. With an active job it is the
    /// first ready job in pool order, i.e. the preemption contender.
    fn select_next(&self, pool: &[Job], active: Option<&Job>, now: Tick) -> Option<usize> {
        match active {
            None => match pool.first() {
                Some(head) if head.is_ready(now) => Some(0),
                Some(_) => earliest_ready(pool, now),
                None => None,
            },
            Some(_) => pool.iter().position(|job| job.is_ready(now)),
        }
    }

    /// Whether `active` should be returned to the pool this tick.
    fn should_preempt(&self, _pool: &[Job], _active: &Job, _now: Tick) -> bool {
        false
    }

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Ready job with the smallest `start`; the first one in pool order on ties.
pub(crate) fn earliest_ready(pool: &[Job], now: Tick) -> Option<usize> {
    pool.iter()
        .enumerate()
        .filter(|(_, job)| job.is_ready(now))
        .min_by_key(|(_, job)| job.start)
        .map(|(idx, _)| idx)
}

/// Built-in policy selector, usable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyKind {
    /// First In First Out, by `start`.
    Fifo,
    /// Earliest Deadline First, non-preemptive.
    Edf,
    /// Shortest Time Remaining, preemptive.
    Str,
}

impl PolicyKind {
    /// All built-in policies, in report column order.
    pub const ALL: [PolicyKind; 3] = [PolicyKind::Fifo, PolicyKind::Edf, PolicyKind::Str];

    /// Instantiates the policy.
    pub fn policy(self) -> Box<dyn SchedulingPolicy> {
        match self {
            PolicyKind::Fifo => Box::new(rules::Fifo),
            PolicyKind::Edf => Box::new(rules::Edf),
            PolicyKind::Str => Box::new(rules::Str),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Edf => "EDF",
            PolicyKind::Str => "STR",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => Ok(PolicyKind::Fifo),
            "edf" | "ed" => Ok(PolicyKind::Edf),
            "str" | "srt" => Ok(PolicyKind::Str),
            _ => Err(SimulationError::UnsupportedPolicy(s.to_string())),
        }
    }
}
