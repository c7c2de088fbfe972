//! Per-tick arrival processes for streaming runs.

use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use super::JobGenerator;
use crate::error::{Result, SimulationError};
use crate::models::{JobSpec, Tick};

/// Supplies zero or one new job per tick.
///
/// Any `FnMut(Tick) -> Option<JobSpec>` closure is an arrival process.
pub trait ArrivalProcess: Send {
    /// Job arriving at `now`, if any.
    fn next_arrival(&mut self, now: Tick) -> Option<JobSpec>;
}

impl<F> ArrivalProcess for F
where
    F: FnMut(Tick) -> Option<JobSpec> + Send,
{
    fn next_arrival(&mut self, now: Tick) -> Option<JobSpec> {
        self(now)
    }
}

/// Bernoulli arrivals: each tick spawns a job with a fixed probability.
///
/// Arriving jobs start on the tick they arrive; size and deadline come
/// from the wrapped [`JobGenerator`]. With a seeded generator the arrival
/// stream is identical across runs, whatever policy consumes it.
pub struct StochasticArrivals {
    generator: JobGenerator,
    probability: f64,
    rng: StdRng,
}

impl StochasticArrivals {
    /// Creates arrivals with `probability` in `(0, 1]`.
    pub fn new(generator: JobGenerator, probability: f64) -> Result<Self> {
        validate_probability(probability)?;
        generator.validate()?;
        let rng = generator.rng();
        Ok(Self {
            generator,
            probability,
            rng,
        })
    }

    /// One arrival every `spawn_rate` ticks on average.
    pub fn from_spawn_rate(generator: JobGenerator, spawn_rate: u32) -> Result<Self> {
        if spawn_rate == 0 {
            return Err(SimulationError::InvalidConfig(
                "spawn rate must be positive".into(),
            ));
        }
        Self::new(generator, 1.0 / f64::from(spawn_rate))
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }
}

impl ArrivalProcess for StochasticArrivals {
    fn next_arrival(&mut self, now: Tick) -> Option<JobSpec> {
        if self.rng.random_bool(self.probability) {
            Some(self.generator.draw_at(&mut self.rng, now))
        } else {
            None
        }
    }
}

impl fmt::Debug for StochasticArrivals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StochasticArrivals")
            .field("probability", &self.probability)
            .field("generator", &self.generator)
            .finish()
    }
}

pub(crate) fn validate_probability(probability: f64) -> Result<()> {
    if probability > 0.0 && probability <= 1.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfig(format!(
            "arrival probability {probability} is outside (0, 1]"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(process: &mut dyn ArrivalProcess, ticks: Tick) -> Vec<JobSpec> {
        (0..ticks).filter_map(|t| process.next_arrival(t)).collect()
    }

    #[test]
    fn test_certain_arrival_every_tick() {
        let mut arrivals = StochasticArrivals::new(JobGenerator::default(), 1.0).unwrap();
        let jobs = collect(&mut arrivals, 5);
        assert_eq!(jobs.len(), 5);
        for (t, job) in jobs.iter().enumerate() {
            assert_eq!(job.start, t as Tick);
            assert_eq!(job.id, None);
            assert!(job.deadline > job.start);
        }
    }

    #[test]
    fn test_seeded_stream_is_reproducible() {
        let generator = JobGenerator::default().with_seed(42);
        let mut a = StochasticArrivals::from_spawn_rate(generator.clone(), 4).unwrap();
        let mut b = StochasticArrivals::from_spawn_rate(generator, 4).unwrap();
        assert_eq!(collect(&mut a, 500), collect(&mut b, 500));
    }

    #[test]
    fn test_spawn_rate_probability() {
        let arrivals = StochasticArrivals::from_spawn_rate(JobGenerator::default(), 20).unwrap();
        assert!((arrivals.probability() - 0.05).abs() < 1e-12);
        assert!(StochasticArrivals::from_spawn_rate(JobGenerator::default(), 0).is_err());
    }

    #[test]
    fn test_probability_bounds() {
        assert!(StochasticArrivals::new(JobGenerator::default(), 0.0).is_err());
        assert!(StochasticArrivals::new(JobGenerator::default(), 1.5).is_err());
        assert!(StochasticArrivals::new(JobGenerator::default(), f64::NAN).is_err());
    }

    #[test]
    fn test_closure_is_arrival_process() {
        let mut every_third = |now: Tick| (now % 3 == 0).then(|| JobSpec::new(1, now, now + 4));
        let jobs = collect(&mut every_third, 7);
        assert_eq!(jobs.iter().map(|j| j.start).collect::<Vec<_>>(), vec![0, 3, 6]);
    }
}
