//! Policy-ordered job pool.

use super::SchedulingPolicy;
use crate::models::{Job, Tick};

/// Jobs waiting for the resource, kept sorted by a policy's order key.
///
/// Insertion is stable: a job placed next to equal-keyed jobs goes after
/// them, so ties resolve in insertion order.
#[derive(Debug, Clone, Default)]
pub struct JobPool {
    jobs: Vec<Job>,
}

impl JobPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a pool from jobs in their given order.
    pub fn from_jobs(policy: &dyn SchedulingPolicy, mut jobs: Vec<Job>) -> Self {
        jobs.sort_by(|a, b| policy.compare(a, b));
        Self { jobs }
    }

    /// Inserts `job` at its ordered position.
    pub fn insert(&mut self, policy: &dyn SchedulingPolicy, job: Job) {
        let pos = self
            .jobs
            .partition_point(|queued| policy.compare(queued, &job).is_le());
        self.jobs.insert(pos, job);
    }

    /// Removes and returns the job at `idx`.
    pub fn take(&mut self, idx: usize) -> Option<Job> {
        (idx < self.jobs.len()).then(|| self.jobs.remove(idx))
    }

    /// Removes every job whose deadline has been reached at `now`.
    pub fn drain_expired(&mut self, now: Tick) -> Vec<Job> {
        let (expired, kept): (Vec<Job>, Vec<Job>) = std::mem::take(&mut self.jobs)
            .into_iter()
            .partition(|job| job.is_expired(now));
        self.jobs = kept;
        expired
    }

    pub fn as_slice(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;

    fn ids(pool: &JobPool) -> Vec<u64> {
        pool.as_slice().iter().map(|j| j.id).collect()
    }

    #[test]
    fn test_from_jobs_sorts_stably() {
        let pool = JobPool::from_jobs(
            &rules::Fifo,
            vec![
                Job::new(0, 1, 4, 10),
                Job::new(1, 1, 0, 10),
                Job::new(2, 1, 0, 10),
            ],
        );
        assert_eq!(ids(&pool), vec![1, 2, 0]);
    }

    #[test]
    fn test_insert_after_equal_keys() {
        let mut pool = JobPool::from_jobs(
            &rules::Str,
            vec![Job::new(0, 2, 0, 10), Job::new(1, 5, 0, 10)],
        );
        pool.insert(&rules::Str, Job::new(2, 2, 0, 10));
        pool.insert(&rules::Str, Job::new(3, 1, 0, 10));
        assert_eq!(ids(&pool), vec![3, 0, 2, 1]);
    }

    #[test]
    fn test_take() {
        let mut pool = JobPool::from_jobs(&rules::Edf, vec![Job::new(0, 1, 0, 10)]);
        assert!(pool.take(1).is_none());
        assert_eq!(pool.take(0).map(|j| j.id), Some(0));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_drain_expired_keeps_order() {
        let mut pool = JobPool::from_jobs(
            &rules::Fifo,
            vec![
                Job::new(0, 1, 0, 3),
                Job::new(1, 1, 1, 9),
                Job::new(2, 1, 2, 2),
                Job::new(3, 1, 3, 8),
            ],
        );
        let expired = pool.drain_expired(3);
        assert_eq!(expired.iter().map(|j| j.id).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(ids(&pool), vec![1, 3]);
        assert_eq!(pool.len(), 2);
    }
}
