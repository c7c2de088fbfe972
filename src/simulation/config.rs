//! Run configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dispatching::PolicyKind;
use crate::error::{Result, SimulationError};
use crate::models::{ModeKind, Tick};
use crate::source::validate_probability;

/// How a run receives jobs and when it stops.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RunMode {
    /// Fixed job set; stops once every job is resolved.
    #[default]
    Bounded,
    /// Per-tick arrivals; stops when the clock reaches `tick_limit`.
    Streaming {
        tick_limit: Tick,
        /// Per-tick arrival probability for generated sources, in `(0, 1]`.
        arrival_probability: f64,
    },
}

impl RunMode {
    /// Streaming with the classic parameters: 1000 ticks, one arrival
    /// every 20 ticks on average.
    pub fn streaming() -> Self {
        RunMode::Streaming {
            tick_limit: 1000,
            arrival_probability: 1.0 / 20.0,
        }
    }

    pub fn kind(&self) -> ModeKind {
        match self {
            RunMode::Bounded => ModeKind::Bounded,
            RunMode::Streaming { .. } => ModeKind::Streaming,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Bounded => "bounded",
            RunMode::Streaming { .. } => "streaming",
        }
    }
}

impl FromStr for RunMode {
    type Err = SimulationError;

    /// Parses a mode name; streaming uses its default parameters.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" | "seeded" => Ok(RunMode::Bounded),
            "streaming" | "random" => Ok(RunMode::streaming()),
            _ => Err(SimulationError::UnsupportedMode(s.to_string())),
        }
    }
}

/// Configuration of a single run.
///
/// # Example
/// ```
/// use u_deadline::dispatching::PolicyKind;
/// use u_deadline::simulation::{RunConfig, RunMode};
///
/// let config = RunConfig::new(PolicyKind::Edf)
///     .with_mode(RunMode::Streaming { tick_limit: 500, arrival_probability: 0.1 });
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub policy: PolicyKind,
    #[serde(flatten)]
    pub mode: RunMode,
    /// Admit jobs with `deadline <= start` instead of rejecting the job set.
    /// Such jobs expire without ever being served.
    #[serde(default)]
    pub allow_unschedulable: bool,
}

impl RunConfig {
    /// Bounded run under `policy`.
    pub fn new(policy: PolicyKind) -> Self {
        Self {
            policy,
            mode: RunMode::Bounded,
            allow_unschedulable: false,
        }
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_allow_unschedulable(mut self, allow: bool) -> Self {
        self.allow_unschedulable = allow;
        self
    }

    /// Same configuration under another policy.
    pub fn for_policy(mut self, policy: PolicyKind) -> Self {
        self.policy = policy;
        self
    }

    /// Checks mode parameters.
    pub fn validate(&self) -> Result<()> {
        if let RunMode::Streaming {
            tick_limit,
            arrival_probability,
        } = self.mode
        {
            if tick_limit == 0 {
                return Err(SimulationError::InvalidConfig(
                    "streaming tick_limit must be positive".into(),
                ));
            }
            validate_probability(arrival_probability)?;
        }
        Ok(())
    }
}
