//! Tick-driven scheduling engine.
//!
//! # Algorithm
//!
//! Each tick runs the same fixed sequence:
//!
//! 1. **Admission**: streaming runs ask the arrival process for a job.
//! 2. **Expiry**: the active job and every pooled job with
//!    `deadline <= tick` are discarded.
//! 3. **Selection**: an idle resource takes the policy's next job;
//!    a busy one is handed over if the policy preempts.
//! 4. **Work**: the active job receives exactly one unit.
//! 5. **Completion**: a finished job is counted and leaves the resource.
//! 6. **Advance**: the clock moves forward by one tick.
//!
//! Bounded runs stop once nothing is pooled or active; streaming runs
//! stop when the clock reaches the tick limit.

use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::{RunConfig, RunMode};
use crate::dispatching::{JobPool, PolicyKind, SchedulingPolicy};
use crate::error::{Result, SimulationError};
use crate::models::{Job, JobId, JobSpec, RunMetrics, Tick};
use crate::source::{ArrivalProcess, JobSource, StochasticArrivals};
use crate::validation::{validate_job, validate_jobs, ValidationError, ValidationErrorKind};

/// Something that happened to a job during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    /// A streaming arrival entered the pool.
    Admitted { job: JobId },
    /// The job reached its deadline unfinished and was discarded.
    Expired { job: JobId, remaining: u64 },
    /// The job took the resource.
    Started { job: JobId },
    /// `job` went back to the pool in favor of `by`.
    Preempted { job: JobId, by: JobId },
    /// One unit of work was applied.
    Worked { job: JobId, completed: u64 },
    /// The job finished before its deadline.
    Completed { job: JobId },
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    admitted: u64,
    completed: u64,
    expired: u64,
    preemptions: u64,
}

/// Single-resource scheduling engine.
///
/// Owns its pool, its active slot and its counters exclusively. Jobs are
/// built from the source's specs at construction, so runs over the same
/// job set never observe each other's progress.
///
/// # Example
///
/// ```
/// use u_deadline::dispatching::PolicyKind;
/// use u_deadline::models::JobSpec;
/// use u_deadline::simulation::SchedulingEngine;
///
/// let jobs = vec![
///     JobSpec::new(3, 0, 10).with_id(0),
///     JobSpec::new(1, 0, 2).with_id(1),
/// ];
///
/// let fifo = SchedulingEngine::bounded(PolicyKind::Fifo, &jobs).unwrap().run().unwrap();
/// let str_ = SchedulingEngine::bounded(PolicyKind::Str, &jobs).unwrap().run().unwrap();
/// assert_eq!(fifo.jobs_completed, 1);
/// assert_eq!(str_.jobs_completed, 2);
/// ```
pub struct SchedulingEngine {
    config: RunConfig,
    policy: Box<dyn SchedulingPolicy>,
    pool: JobPool,
    active: Option<Job>,
    arrivals: Option<Box<dyn ArrivalProcess>>,
    issued_ids: HashSet<JobId>,
    next_id: JobId,
    now: Tick,
    counters: Counters,
    wall_time: Duration,
}

impl SchedulingEngine {
    /// Creates an engine, validating the configuration and, for bounded
    /// sources, the whole job set before any tick runs.
    pub fn new(config: RunConfig, source: JobSource) -> Result<Self> {
        config.validate()?;

        let mut engine = Self {
            config,
            policy: config.policy.policy(),
            pool: JobPool::new(),
            active: None,
            arrivals: None,
            issued_ids: HashSet::new(),
            next_id: 0,
            now: 0,
            counters: Counters::default(),
            wall_time: Duration::ZERO,
        };

        match (config.mode, source) {
            (RunMode::Bounded, JobSource::Bounded(specs)) => engine.load(&specs)?,
            (RunMode::Bounded, JobSource::Generated(generator)) => {
                let specs = generator.generate()?;
                engine.load(&specs)?;
            }
            (
                RunMode::Streaming {
                    tick_limit,
                    arrival_probability,
                },
                JobSource::Generated(generator),
            ) => {
                generator.validate_horizon(tick_limit.saturating_sub(1))?;
                let arrivals = StochasticArrivals::new(generator, arrival_probability)?;
                engine.arrivals = Some(Box::new(arrivals));
            }
            (RunMode::Streaming { .. }, JobSource::Arrivals(process)) => {
                engine.arrivals = Some(process);
            }
            (mode, source) => {
                return Err(SimulationError::ModeMismatch {
                    mode: mode.as_str(),
                    source_kind: source.kind(),
                })
            }
        }

        Ok(engine)
    }

    /// Bounded engine over a copy of `specs`.
    pub fn bounded(policy: PolicyKind, specs: &[JobSpec]) -> Result<Self> {
        Self::new(RunConfig::new(policy), JobSource::bounded(specs))
    }

    fn load(&mut self, specs: &[JobSpec]) -> Result<()> {
        validate_jobs(specs, self.config.allow_unschedulable)
            .map_err(SimulationError::InvalidJobs)?;

        self.issued_ids = specs.iter().filter_map(|spec| spec.id).collect();
        let mut jobs = Vec::with_capacity(specs.len());
        for spec in specs {
            let id = match spec.id {
                Some(id) => id,
                None => self.fresh_id(),
            };
            if spec.is_unschedulable() {
                warn!(
                    job = id,
                    start = spec.start,
                    deadline = spec.deadline,
                    "admitting unschedulable job"
                );
            }
            jobs.push(Job::from_spec(spec, id));
        }

        self.counters.admitted = jobs.len() as u64;
        self.pool = JobPool::from_jobs(self.policy.as_ref(), jobs);
        debug!(
            policy = self.policy.name(),
            rule = self.policy.description(),
            jobs = self.counters.admitted,
            "loaded bounded job set"
        );
        Ok(())
    }

    /// Smallest id not yet handed out.
    fn fresh_id(&mut self) -> JobId {
        while self.issued_ids.contains(&self.next_id) {
            self.next_id += 1;
        }
        let id = self.next_id;
        self.issued_ids.insert(id);
        self.next_id += 1;
        id
    }

    /// Runs one tick and reports what happened in it.
    ///
    /// Does nothing once the run is finished.
    pub fn step(&mut self) -> Result<Vec<TickEvent>> {
        let mut events = Vec::new();
        if self.is_finished() {
            return Ok(events);
        }
        let now = self.now;

        self.admit_arrival(now, &mut events)?;
        self.expire(now, &mut events);
        self.select(now, &mut events)?;
        self.work(now, &mut events)?;
        self.check_invariants()?;

        self.now += 1;
        Ok(events)
    }

    /// Runs until termination and returns the run's metrics.
    pub fn run(mut self) -> Result<RunMetrics> {
        let started = Instant::now();
        while !self.is_finished() {
            self.step()?;
        }
        self.wall_time = started.elapsed();

        let metrics = self.metrics();
        info!(
            policy = %metrics.policy,
            mode = self.config.mode.as_str(),
            ticks = metrics.ticks_elapsed,
            completed = metrics.jobs_completed,
            expired = metrics.jobs_expired,
            pending = metrics.jobs_pending,
            "run finished"
        );
        Ok(metrics)
    }

    fn admit_arrival(&mut self, now: Tick, events: &mut Vec<TickEvent>) -> Result<()> {
        let Some(spec) = self
            .arrivals
            .as_mut()
            .and_then(|arrivals| arrivals.next_arrival(now))
        else {
            return Ok(());
        };

        let position = self.counters.admitted as usize;
        validate_job(&spec, position, self.config.allow_unschedulable)
            .map_err(SimulationError::InvalidJobs)?;

        let id = match spec.id {
            Some(id) => {
                if !self.issued_ids.insert(id) {
                    return Err(SimulationError::InvalidJobs(vec![ValidationError::new(
                        ValidationErrorKind::DuplicateId,
                        format!("Duplicate job ID: {id}"),
                    )]));
                }
                id
            }
            None => self.fresh_id(),
        };

        let job = Job::from_spec(&spec, id);
        debug!(job = id, tick = now, size = job.size, deadline = job.deadline, "job arrived");
        self.pool.insert(self.policy.as_ref(), job);
        self.counters.admitted += 1;
        events.push(TickEvent::Admitted { job: id });
        Ok(())
    }

    fn expire(&mut self, now: Tick, events: &mut Vec<TickEvent>) {
        if self.active.as_ref().is_some_and(|job| job.is_expired(now)) {
            if let Some(job) = self.active.take() {
                self.record_expiry(&job, now, events);
            }
        }
        for job in self.pool.drain_expired(now) {
            self.record_expiry(&job, now, events);
        }
    }

    fn record_expiry(&mut self, job: &Job, now: Tick, events: &mut Vec<TickEvent>) {
        debug!(job = job.id, tick = now, remaining = job.remaining(), "job expired");
        self.counters.expired += 1;
        events.push(TickEvent::Expired {
            job: job.id,
            remaining: job.remaining(),
        });
    }

    fn select(&mut self, now: Tick, events: &mut Vec<TickEvent>) -> Result<()> {
        match self.active.take() {
            None => {
                if let Some(idx) = self.policy.select_next(self.pool.as_slice(), None, now) {
                    let job = self.take_from_pool(idx)?;
                    events.push(TickEvent::Started { job: job.id });
                    self.active = Some(job);
                }
            }
            Some(active) => {
                let contender = if self.policy.is_preemptive()
                    && self.policy.should_preempt(self.pool.as_slice(), &active, now)
                {
                    self.policy
                        .select_next(self.pool.as_slice(), Some(&active), now)
                } else {
                    None
                };

                match contender {
                    Some(idx) => {
                        let next = self.take_from_pool(idx)?;
                        debug!(
                            job = active.id,
                            by = next.id,
                            tick = now,
                            remaining = active.remaining(),
                            "job preempted"
                        );
                        self.counters.preemptions += 1;
                        events.push(TickEvent::Preempted {
                            job: active.id,
                            by: next.id,
                        });
                        events.push(TickEvent::Started { job: next.id });
                        self.pool.insert(self.policy.as_ref(), active);
                        self.active = Some(next);
                    }
                    None => self.active = Some(active),
                }
            }
        }
        Ok(())
    }

    fn take_from_pool(&mut self, idx: usize) -> Result<Job> {
        let len = self.pool.len();
        self.pool.take(idx).ok_or_else(|| {
            SimulationError::InvariantViolation(format!(
                "policy {} selected index {idx} from a pool of {len}",
                self.policy.name()
            ))
        })
    }

    fn work(&mut self, now: Tick, events: &mut Vec<TickEvent>) -> Result<()> {
        let Some(job) = self.active.as_mut() else {
            return Ok(());
        };
        if !job.is_ready(now) {
            return Ok(());
        }

        job.apply_work()?;
        let id = job.id;
        events.push(TickEvent::Worked {
            job: id,
            completed: job.completed,
        });

        if job.is_complete() {
            self.active = None;
            self.counters.completed += 1;
            debug!(job = id, tick = now, "job completed");
            events.push(TickEvent::Completed { job: id });
        }
        Ok(())
    }

    /// Every admitted job is completed, expired, pooled or active.
    fn check_invariants(&self) -> Result<()> {
        let resolved = self.counters.completed + self.counters.expired + self.pending_count();
        if resolved != self.counters.admitted {
            return Err(SimulationError::InvariantViolation(format!(
                "admitted {} jobs but accounted for {resolved} at tick {}",
                self.counters.admitted, self.now
            )));
        }
        if let Some(job) = &self.active {
            if job.completed > job.size {
                return Err(SimulationError::InvariantViolation(format!(
                    "active job {} has {} of {} units done",
                    job.id, job.completed, job.size
                )));
            }
        }
        Ok(())
    }

    fn pending_count(&self) -> u64 {
        self.pool.len() as u64 + u64::from(self.active.is_some())
    }

    /// Whether the run has reached its termination condition.
    pub fn is_finished(&self) -> bool {
        match self.config.mode {
            RunMode::Bounded => self.pool.is_empty() && self.active.is_none(),
            RunMode::Streaming { tick_limit, .. } => self.now >= tick_limit,
        }
    }

    /// Metrics as of the current tick.
    ///
    /// Wall time is only measured by [`run`](Self::run).
    pub fn metrics(&self) -> RunMetrics {
        RunMetrics {
            policy: self.config.policy,
            mode: self.config.mode.kind(),
            ticks_elapsed: self.now,
            jobs_admitted: self.counters.admitted,
            jobs_completed: self.counters.completed,
            jobs_expired: self.counters.expired,
            jobs_pending: self.pending_count(),
            preemptions: self.counters.preemptions,
            wall_time: self.wall_time,
        }
    }

    /// Current clock value (the next tick to run).
    pub fn now(&self) -> Tick {
        self.now
    }

    /// Job currently holding the resource.
    pub fn active(&self) -> Option<&Job> {
        self.active.as_ref()
    }

    /// Jobs waiting in the pool, in policy order.
    pub fn pending(&self) -> &[Job] {
        self.pool.as_slice()
    }

    /// Configuration the run was built with.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Policy ordering the pool.
    pub fn policy(&self) -> &dyn SchedulingPolicy {
        self.policy.as_ref()
    }
}

impl fmt::Debug for SchedulingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulingEngine")
            .field("policy", &self.policy.name())
            .field("rule", &self.policy.description())
            .field("mode", &self.config.mode)
            .field("now", &self.now)
            .field("active", &self.active.as_ref().map(|job| job.id))
            .field("pooled", &self.pool.len())
            .field("streaming", &self.arrivals.is_some())
            .finish()
    }
}

/// Builds an engine and runs it to termination.
pub fn simulate(config: RunConfig, source: JobSource) -> Result<RunMetrics> {
    SchedulingEngine::new(config, source)?.run()
}
