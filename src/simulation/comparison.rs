//! Side-by-side policy comparison.
//!
//! Runs every built-in policy over the same workload and collects the
//! results per seed. Bounded comparisons feed each policy its own copy of
//! one generated job set; streaming comparisons give each policy a fresh
//! arrival process built from the same seed, so all three see an
//! identical arrival stream.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{RunConfig, RunMode};
use super::engine::simulate;
use crate::dispatching::PolicyKind;
use crate::error::Result;
use crate::models::{JobSpec, RunMetrics, Tick};
use crate::source::{JobGenerator, JobSource};

/// Runs FIFO, EDF and STR over independent copies of `specs`.
///
/// `config.policy` is ignored; everything else applies to every run.
pub fn compare_policies(config: RunConfig, specs: &[JobSpec]) -> Result<Vec<RunMetrics>> {
    PolicyKind::ALL
        .iter()
        .map(|&kind| simulate(config.for_policy(kind), JobSource::bounded(specs)))
        .collect()
}

/// Results of every policy for one seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub seed: u64,
    /// One entry per policy, in [`PolicyKind::ALL`] order.
    pub runs: Vec<RunMetrics>,
}

impl ComparisonRow {
    /// Metrics of `policy` in this row.
    pub fn get(&self, policy: PolicyKind) -> Option<&RunMetrics> {
        self.runs.iter().find(|m| m.policy == policy)
    }

    /// Completed-job count of `policy` in this row.
    pub fn completed(&self, policy: PolicyKind) -> Option<u64> {
        self.get(policy).map(|m| m.jobs_completed)
    }
}

/// Per-seed comparison of all built-in policies.
///
/// # Example
/// ```
/// use u_deadline::dispatching::PolicyKind;
/// use u_deadline::simulation::ComparisonReport;
/// use u_deadline::source::JobGenerator;
///
/// let generator = JobGenerator::default().with_job_count(20);
/// let report = ComparisonReport::seeded(&generator, 0..3).unwrap();
/// assert_eq!(report.rows.len(), 3);
///
/// let mut csv = Vec::new();
/// report.write_csv(&mut csv).unwrap();
/// assert!(String::from_utf8(csv).unwrap().contains("seed,FIFO,EDF,STR"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generator: JobGenerator,
    pub mode: RunMode,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonReport {
    /// Bounded comparison: one generated job set per seed.
    pub fn seeded(generator: &JobGenerator, seeds: impl IntoIterator<Item = u64>) -> Result<Self> {
        let config = RunConfig::new(PolicyKind::Fifo);
        let mut rows = Vec::new();
        for seed in seeds {
            let specs = generator.clone().with_seed(seed).generate()?;
            let runs = compare_policies(config, &specs)?;
            debug!(seed, jobs = specs.len(), "compared policies on seeded job set");
            rows.push(ComparisonRow { seed, runs });
        }
        Ok(Self {
            generator: generator.clone(),
            mode: RunMode::Bounded,
            rows,
        })
    }

    /// Streaming comparison: one arrival stream per seed.
    pub fn streaming(
        generator: &JobGenerator,
        tick_limit: Tick,
        arrival_probability: f64,
        seeds: impl IntoIterator<Item = u64>,
    ) -> Result<Self> {
        let mode = RunMode::Streaming {
            tick_limit,
            arrival_probability,
        };
        let mut rows = Vec::new();
        for seed in seeds {
            let seeded = generator.clone().with_seed(seed);
            let runs = PolicyKind::ALL
                .iter()
                .map(|&kind| {
                    simulate(
                        RunConfig::new(kind).with_mode(mode),
                        JobSource::generated(seeded.clone()),
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            debug!(seed, tick_limit, "compared policies on arrival stream");
            rows.push(ComparisonRow { seed, runs });
        }
        Ok(Self {
            generator: generator.clone(),
            mode,
            rows,
        })
    }

    /// Total completed jobs per policy across all rows.
    pub fn totals(&self) -> Vec<(PolicyKind, u64)> {
        PolicyKind::ALL
            .iter()
            .map(|&kind| {
                let total = self.rows.iter().filter_map(|row| row.completed(kind)).sum();
                (kind, total)
            })
            .collect()
    }

    /// Writes the report as comma-separated text.
    ///
    /// A short preamble of workload parameters precedes a
    /// `seed,FIFO,EDF,STR` header and one row of completed counts per seed.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        match self.mode {
            RunMode::Bounded => writeln!(out, "jobs,{}", self.generator.job_count)?,
            RunMode::Streaming {
                tick_limit,
                arrival_probability,
            } => {
                writeln!(out, "runtime,{tick_limit}")?;
                writeln!(out, "arrival_probability,{arrival_probability}")?;
            }
        }
        writeln!(
            out,
            "size,{},{}",
            self.generator.size_min, self.generator.size_max
        )?;
        writeln!(out, "deadline,{}", self.generator.deadline_slack)?;

        let header: Vec<&str> = PolicyKind::ALL.iter().map(|k| k.as_str()).collect();
        writeln!(out, "seed,{}", header.join(","))?;

        for row in &self.rows {
            let counts: Vec<String> = PolicyKind::ALL
                .iter()
                .map(|&kind| {
                    row.completed(kind)
                        .map(|c| c.to_string())
                        .unwrap_or_default()
                })
                .collect();
            writeln!(out, "{},{}", row.seed, counts.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::SchedulingEngine;

    fn small_generator() -> JobGenerator {
        JobGenerator::default().with_job_count(30)
    }

    #[test]
    fn test_compare_policies_order_and_independence() {
        let specs = small_generator().generate().unwrap();
        let runs = compare_policies(RunConfig::new(PolicyKind::Str), &specs).unwrap();

        let kinds: Vec<PolicyKind> = runs.iter().map(|m| m.policy).collect();
        assert_eq!(kinds, PolicyKind::ALL.to_vec());

        for m in &runs {
            let alone = SchedulingEngine::bounded(m.policy, &specs).unwrap().run().unwrap();
            assert_eq!(m.jobs_completed, alone.jobs_completed);
            assert_eq!(m.ticks_elapsed, alone.ticks_elapsed);
        }
    }

    #[test]
    fn test_seeded_report_rows() {
        let report = ComparisonReport::seeded(&small_generator(), 0..4).unwrap();
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.mode, RunMode::Bounded);
        for (seed, row) in (0..4).zip(&report.rows) {
            assert_eq!(row.seed, seed);
            assert_eq!(row.runs.len(), 3);
            assert!(row.runs.iter().all(|m| m.is_conserved() && m.jobs_admitted == 30));
        }
    }

    #[test]
    fn test_seeded_report_is_reproducible() {
        let a = ComparisonReport::seeded(&small_generator(), [3, 7]).unwrap();
        let b = ComparisonReport::seeded(&small_generator(), [3, 7]).unwrap();
        assert_eq!(a.totals(), b.totals());
    }

    #[test]
    fn test_streaming_rows_share_arrivals() {
        let report = ComparisonReport::streaming(&small_generator(), 400, 0.1, 0..2).unwrap();
        for row in &report.rows {
            let admitted: Vec<u64> = row.runs.iter().map(|m| m.jobs_admitted).collect();
            assert!(admitted.windows(2).all(|w| w[0] == w[1]));
            assert!(row.runs.iter().all(|m| m.ticks_elapsed == 400));
        }
    }

    #[test]
    fn test_streaming_rejects_bad_probability() {
        assert!(ComparisonReport::streaming(&small_generator(), 100, 2.0, 0..1).is_err());
    }

    #[test]
    fn test_csv_layout() {
        let report = ComparisonReport::seeded(&small_generator(), [5]).unwrap();
        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "jobs,30");
        assert_eq!(lines[1], "size,1,50");
        assert_eq!(lines[2], "deadline,200");
        assert_eq!(lines[3], "seed,FIFO,EDF,STR");

        let row = &report.rows[0];
        let expected = format!(
            "5,{},{},{}",
            row.completed(PolicyKind::Fifo).unwrap(),
            row.completed(PolicyKind::Edf).unwrap(),
            row.completed(PolicyKind::Str).unwrap()
        );
        assert_eq!(lines[4], expected);
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_streaming_csv_preamble() {
        let report = ComparisonReport::streaming(&small_generator(), 50, 0.5, [1]).unwrap();
        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("runtime,50\narrival_probability,0.5\n"));
    }
}
