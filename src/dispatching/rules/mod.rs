//! Built-in scheduling policies.
//!
//! | Policy | Order key | Preemptive | Tie-break |
//! |--------|-----------|------------|-----------|
//! | FIFO | `start` | no | insertion order |
//! | EDF | `deadline` | no | `start`, then insertion order |
//! | STR | `remaining` | yes | `start`, then insertion order |
//!
//! EDF here is deliberately non-preemptive: once a job holds the resource
//! it keeps it until completion or expiry, even if a job with an earlier
//! deadline becomes ready.

use std::cmp::Ordering;

use super::SchedulingPolicy;
use crate::models::{Job, Tick};

/// First In First Out.
///
/// Serves jobs in order of their `start` tick, never preempting.
#[derive(Debug, Clone, Copy)]
pub struct Fifo;

impl SchedulingPolicy for Fifo {
    fn name(&self) -> &'static str {
        "FIFO"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.start.cmp(&b.start)
    }

    fn description(&self) -> &'static str {
        "First In First Out"
    }
}

/// Earliest Deadline First (non-preemptive).
#[derive(Debug, Clone, Copy)]
pub struct Edf;

impl SchedulingPolicy for Edf {
    fn name(&self) -> &'static str {
        "EDF"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.deadline
            .cmp(&b.deadline)
            .then_with(|| a.start.cmp(&b.start))
    }

    fn description(&self) -> &'static str {
        "Earliest Deadline First"
    }
}

/// Shortest Time Remaining.
///
/// Preempts the active job whenever the best ready job in the pool has
/// strictly less work remaining. Progress of the preempted job is kept.
#[derive(Debug, Clone, Copy)]
pub struct Str;

impl SchedulingPolicy for Str {
    fn name(&self) -> &'static str {
        "STR"
    }

    fn compare(&self, a: &Job, b: &Job) -> Ordering {
        a.remaining()
            .cmp(&b.remaining())
            .then_with(|| a.start.cmp(&b.start))
    }

    fn is_preemptive(&self) -> bool {
        true
    }

    fn should_preempt(&self, pool: &[Job], active: &Job, now: Tick) -> bool {
        self.select_next(pool, Some(active), now)
            .is_some_and(|idx| pool[idx].remaining() < active.remaining())
    }

    fn description(&self) -> &'static str {
        "Shortest Time Remaining"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u64, size: u64, start: Tick, deadline: Tick) -> Job {
        Job::new(id, size, start, deadline)
    }

    fn sorted(policy: &dyn SchedulingPolicy, mut jobs: Vec<Job>) -> Vec<u64> {
        jobs.sort_by(|a, b| policy.compare(a, b));
        jobs.iter().map(|j| j.id).collect()
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Fifo.description(), "First In First Out");
        assert_eq!(Edf.description(), "Earliest Deadline First");
        assert_eq!(Str.description(), "Shortest Time Remaining");
    }

    #[test]
    fn test_fifo_orders_by_start() {
        let jobs = vec![job(0, 1, 5, 50), job(1, 9, 0, 50), job(2, 3, 2, 50)];
        assert_eq!(sorted(&Fifo, jobs), vec![1, 2, 0]);
    }

    #[test]
    fn test_fifo_ties_keep_insertion_order() {
        let jobs = vec![job(3, 1, 0, 9), job(1, 1, 0, 9), job(2, 1, 0, 9)];
        assert_eq!(sorted(&Fifo, jobs), vec![3, 1, 2]);
    }

    #[test]
    fn test_edf_orders_by_deadline_then_start() {
        let jobs = vec![
            job(0, 1, 4, 20),
            job(1, 1, 1, 20),
            job(2, 1, 0, 8),
        ];
        assert_eq!(sorted(&Edf, jobs), vec![2, 1, 0]);
    }

    #[test]
    fn test_str_orders_by_remaining_then_start() {
        let mut partially_done = job(0, 5, 3, 40);
        partially_done.completed = 4;
        let jobs = vec![job(1, 2, 1, 40), partially_done, job(2, 2, 0, 40)];
        assert_eq!(sorted(&Str, jobs), vec![0, 2, 1]);
    }

    #[test]
    fn test_only_str_preempts() {
        let active = job(0, 10, 0, 100);
        let pool = vec![job(1, 1, 0, 100)];
        assert!(Str.should_preempt(&pool, &active, 0));
        assert!(!Fifo.should_preempt(&pool, &active, 0));
        assert!(!Edf.should_preempt(&pool, &active, 0));
    }

    #[test]
    fn test_str_requires_strictly_shorter() {
        let mut active = job(0, 4, 0, 100);
        active.completed = 2;
        let pool = vec![job(1, 2, 0, 100)];
        assert!(!Str.should_preempt(&pool, &active, 1));
    }

    #[test]
    fn test_str_ignores_unready_contender() {
        let active = job(0, 10, 0, 100);
        let pool = vec![job(1, 1, 5, 100), job(2, 8, 0, 100)];
        assert!(!Str.should_preempt(&pool, &active, 1));
        assert!(Str.should_preempt(&pool, &active, 5));
    }

    #[test]
    fn test_str_uses_best_ready_behind_unready_head() {
        let active = job(0, 10, 0, 100);
        let pool = vec![job(1, 1, 5, 100), job(2, 3, 0, 100)];
        assert!(Str.should_preempt(&pool, &active, 1));
    }
}
