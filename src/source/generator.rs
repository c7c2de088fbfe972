//! Random job-set generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::models::{JobId, JobSpec, Tick};

/// How a generated job's deadline is derived from its start and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadlineMode {
    /// `deadline = start + size + slack`.
    #[default]
    Fixed,
    /// `deadline` uniform in `[start + size, start + size + slack]`.
    Uniform,
}

/// Parameters for drawing job specs.
///
/// Defaults reproduce the classic experiment: 100 jobs, sizes 1..=50,
/// starts 0..=100, 200 ticks of deadline slack, seed 3.
///
/// # Example
/// ```
/// use u_deadline::source::JobGenerator;
///
/// let generator = JobGenerator::default().with_job_count(10).with_seed(7);
/// let a = generator.generate().unwrap();
/// let b = generator.generate().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobGenerator {
    /// Jobs produced by [`generate`](Self::generate).
    pub job_count: usize,
    /// Smallest job size (work units).
    pub size_min: u64,
    /// Largest job size (work units).
    pub size_max: u64,
    /// Earliest start tick for bounded job sets.
    pub start_min: Tick,
    /// Latest start tick for bounded job sets.
    pub start_max: Tick,
    /// Ticks of slack beyond `start + size`.
    pub deadline_slack: Tick,
    pub deadline_mode: DeadlineMode,
    /// RNG seed. `None` = fresh OS entropy on every run.
    pub seed: Option<u64>,
}

impl Default for JobGenerator {
    fn default() -> Self {
        Self {
            job_count: 100,
            size_min: 1,
            size_max: 50,
            start_min: 0,
            start_max: 100,
            deadline_slack: 200,
            deadline_mode: DeadlineMode::Fixed,
            seed: Some(3),
        }
    }
}

impl JobGenerator {
    pub fn with_job_count(mut self, job_count: usize) -> Self {
        self.job_count = job_count;
        self
    }

    pub fn with_size_range(mut self, min: u64, max: u64) -> Self {
        self.size_min = min;
        self.size_max = max;
        self
    }

    pub fn with_start_range(mut self, min: Tick, max: Tick) -> Self {
        self.start_min = min;
        self.start_max = max;
        self
    }

    pub fn with_deadline_slack(mut self, slack: Tick) -> Self {
        self.deadline_slack = slack;
        self
    }

    pub fn with_deadline_mode(mut self, mode: DeadlineMode) -> Self {
        self.deadline_mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Draws from OS entropy instead of a fixed seed.
    pub fn unseeded(mut self) -> Self {
        self.seed = None;
        self
    }

    /// Checks that every range can be sampled.
    pub fn validate(&self) -> Result<()> {
        if self.size_min == 0 {
            return Err(SimulationError::InvalidConfig(
                "generator size_min must be positive".into(),
            ));
        }
        if self.size_min > self.size_max {
            return Err(SimulationError::InvalidConfig(format!(
                "generator size range {}..={} is empty",
                self.size_min, self.size_max
            )));
        }
        if self.start_min > self.start_max {
            return Err(SimulationError::InvalidConfig(format!(
                "generator start range {}..={} is empty",
                self.start_min, self.start_max
            )));
        }
        self.validate_horizon(self.start_max)
    }

    /// Checks that a job starting at `latest_start` gets a representable
    /// deadline.
    pub fn validate_horizon(&self, latest_start: Tick) -> Result<()> {
        latest_start
            .checked_add(self.size_max)
            .and_then(|finish| finish.checked_add(self.deadline_slack))
            .map(|_| ())
            .ok_or_else(|| {
                SimulationError::InvalidConfig(format!(
                    "deadline overflows for start {latest_start}, size {} and slack {}",
                    self.size_max, self.deadline_slack
                ))
            })
    }

    /// RNG for one run: seeded when a seed is configured.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Materializes `job_count` specs with ids `0..job_count`.
    pub fn generate(&self) -> Result<Vec<JobSpec>> {
        self.validate()?;
        let mut rng = self.rng();
        Ok((0..self.job_count as JobId)
            .map(|id| {
                let start = rng.random_range(self.start_min..=self.start_max);
                self.draw_at(&mut rng, start).with_id(id)
            })
            .collect())
    }

    /// Draws size and deadline for a job starting at `start`.
    ///
    /// The caller must have validated the generator. Deadlines past
    /// [`validate_horizon`](Self::validate_horizon) saturate at `Tick::MAX`.
    pub fn draw_at<R: Rng>(&self, rng: &mut R, start: Tick) -> JobSpec {
        let size = rng.random_range(self.size_min..=self.size_max);
        let earliest_finish = start.saturating_add(size);
        let latest = earliest_finish.saturating_add(self.deadline_slack);
        let deadline = match self.deadline_mode {
            DeadlineMode::Fixed => latest,
            DeadlineMode::Uniform => rng.random_range(earliest_finish..=latest),
        };
        JobSpec::new(size, start, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate_jobs;

    #[test]
    fn test_defaults() {
        let g = JobGenerator::default();
        assert_eq!(g.job_count, 100);
        assert_eq!((g.size_min, g.size_max), (1, 50));
        assert_eq!((g.start_min, g.start_max), (0, 100));
        assert_eq!(g.deadline_slack, 200);
        assert_eq!(g.seed, Some(3));
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let g = JobGenerator::default().with_seed(11);
        assert_eq!(g.generate().unwrap(), g.generate().unwrap());
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = JobGenerator::default().with_seed(1).generate().unwrap();
        let b = JobGenerator::default().with_seed(2).generate().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_jobs_respect_ranges() {
        let g = JobGenerator::default()
            .with_size_range(2, 6)
            .with_start_range(10, 20)
            .with_deadline_slack(5)
            .with_deadline_mode(DeadlineMode::Uniform);
        let jobs = g.generate().unwrap();

        for (i, job) in jobs.iter().enumerate() {
            assert_eq!(job.id, Some(i as u64));
            assert!((2..=6).contains(&job.size));
            assert!((10..=20).contains(&job.start));
            let finish = job.start + job.size;
            assert!(job.deadline >= finish && job.deadline <= finish + 5);
        }
        assert!(validate_jobs(&jobs, false).is_ok());
    }

    #[test]
    fn test_fixed_deadline() {
        let jobs = JobGenerator::default()
            .with_deadline_slack(7)
            .generate()
            .unwrap();
        assert!(jobs.iter().all(|j| j.deadline == j.start + j.size + 7));
    }

    #[test]
    fn test_invalid_ranges() {
        assert!(JobGenerator::default().with_size_range(0, 3).validate().is_err());
        assert!(JobGenerator::default().with_size_range(5, 3).validate().is_err());
        assert!(JobGenerator::default().with_start_range(9, 1).generate().is_err());
    }

    #[test]
    fn test_deadline_overflow_rejected() {
        let g = JobGenerator::default().with_deadline_slack(u64::MAX);
        assert!(matches!(g.validate(), Err(SimulationError::InvalidConfig(_))));
        assert!(g.generate().is_err());

        let late = JobGenerator::default().with_start_range(0, u64::MAX - 10);
        assert!(late.validate().is_err());

        let edge = JobGenerator::default()
            .with_size_range(1, 1)
            .with_start_range(0, 0)
            .with_deadline_slack(u64::MAX - 1);
        assert!(edge.validate().is_ok());
        assert_eq!(edge.with_job_count(1).generate().unwrap()[0].deadline, u64::MAX);
    }

    #[test]
    fn test_validate_horizon() {
        let g = JobGenerator::default().with_deadline_slack(u64::MAX - 100);
        assert!(g.validate().is_err());
        assert!(g.validate_horizon(50).is_ok());
        assert!(g.validate_horizon(51).is_err());
    }

    #[test]
    fn test_draw_at_saturates_instead_of_wrapping() {
        let g = JobGenerator::default().with_deadline_mode(DeadlineMode::Uniform);
        let mut rng = g.rng();
        let spec = g.draw_at(&mut rng, u64::MAX - 1);
        assert_eq!(spec.deadline, u64::MAX);
        assert!(spec.deadline >= spec.start);
    }

    #[test]
    fn test_unseeded_still_valid() {
        let jobs = JobGenerator::default().with_job_count(5).unseeded().generate().unwrap();
        assert_eq!(jobs.len(), 5);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let g: JobGenerator =
            serde_json::from_str(r#"{"job_count": 12, "deadline_mode": "uniform"}"#).unwrap();
        assert_eq!(g.job_count, 12);
        assert_eq!(g.deadline_mode, DeadlineMode::Uniform);
        assert_eq!(g.size_max, 50);
    }
}
