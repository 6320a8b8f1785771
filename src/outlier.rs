//! Measurement outlier detection for data-quality validation
//!
//! For each `(run, metric)` the band `[mean - k*stddev, mean + k*stddev]`
//! (k = 2 by default) is computed over all executions of that run. A
//! measurement is an outlier when it falls strictly outside the band.
//!
//! Known limitation: a sample of n values can never deviate more than
//! `(n - 1) / sqrt(n)` sample standard deviations from its own mean. For
//! n = 3 that is ~1.15, so with k = 2 small runs never report outliers.
//! Validation reports are calibrated to this behaviour.

use crate::aggregate::{AggregateIndex, RunAggregate};
use crate::metric::MetricKey;
use crate::model::{Dataset, ExecutionId, RunId};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Default band width in standard deviations
pub const DEFAULT_SIGMA: f64 = 2.0;

/// Inclusive acceptance band around a run's mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierBand {
    pub low: f64,
    pub high: f64,
}

impl OutlierBand {
    /// Band for an aggregate, `None` when its standard deviation is undefined
    pub fn for_aggregate(aggregate: &RunAggregate, sigma: f64) -> Option<Self> {
        let stddev = aggregate.stddev()?;
        let mean = aggregate.mean();
        Some(Self {
            low: mean - sigma * stddev,
            high: mean + sigma * stddev,
        })
    }

    /// Bounds are inclusive: values exactly on the edge are not outliers
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

/// A single flagged measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outlier {
    pub run_id: RunId,
    pub execution_id: ExecutionId,
    pub metric: MetricKey,
    pub value: f64,
    pub band: OutlierBand,
    /// Standard deviations from the run mean (signed)
    pub z_score: f64,
}

/// Outlier totals for one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunOutlierCounts {
    pub executions: usize,
    pub measurements: usize,
    pub outliers: usize,
    pub driver_outliers: usize,
    /// Executions with at least one outlier measurement
    pub outlier_executions: usize,
    pub metrics_with_outliers: BTreeSet<String>,
}

/// Outlier totals for one metric across all runs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricOutlierCounts {
    pub measurements: usize,
    pub outliers: usize,
}

/// Result of running the detector over a dataset
#[derive(Debug, Clone, Default)]
pub struct OutlierReport {
    /// Flagged measurements ordered by run, metric, execution
    pub outliers: Vec<Outlier>,
    pub by_run: BTreeMap<RunId, RunOutlierCounts>,
    pub by_metric: BTreeMap<MetricKey, MetricOutlierCounts>,
    pub by_run_metric: BTreeMap<(RunId, MetricKey), usize>,
}

impl OutlierReport {
    pub fn run_counts(&self, run_id: RunId) -> Option<&RunOutlierCounts> {
        self.by_run.get(&run_id)
    }

    /// Outliers of one `(run, metric)`
    pub fn count_for(&self, run_id: RunId, metric: &MetricKey) -> usize {
        self.by_run_metric
            .get(&(run_id, metric.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.outliers.len()
    }
}

/// Sigma-band outlier detector
#[derive(Debug, Clone)]
pub struct OutlierDetector {
    sigma: f64,
}

impl Default for OutlierDetector {
    fn default() -> Self {
        Self::new(DEFAULT_SIGMA)
    }
}

impl OutlierDetector {
    /// Create a detector flagging values beyond `sigma` standard deviations
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Check a value against the distribution of its run
    ///
    /// Returns the flagged outlier, or `None` when the value is inside the
    /// band or the band is undefined (single execution).
    pub fn check(
        &self,
        aggregate: &RunAggregate,
        execution_id: ExecutionId,
        value: f64,
    ) -> Option<Outlier> {
        let band = OutlierBand::for_aggregate(aggregate, self.sigma)?;
        if band.contains(value) {
            return None;
        }

        // An empty band (stddev = 0) flags any deviating value; the z-score
        // is then infinite in the direction of the deviation.
        let stddev = aggregate.stddev().unwrap_or(0.0);
        let z_score = if stddev > 0.0 {
            (value - aggregate.mean()) / stddev
        } else if value > aggregate.mean() {
            f64::INFINITY
        } else {
            f64::NEG_INFINITY
        };

        Some(Outlier {
            run_id: aggregate.run_id,
            execution_id,
            metric: aggregate.metric.clone(),
            value,
            band,
            z_score,
        })
    }

    /// Classify every measurement of every ended run
    pub fn detect(&self, dataset: &Dataset, aggregates: &AggregateIndex) -> OutlierReport {
        let mut report = OutlierReport::default();
        let mut outlier_executions: BTreeMap<RunId, BTreeSet<ExecutionId>> = BTreeMap::new();

        for run in dataset.ended_runs() {
            report.by_run.insert(
                run.id,
                RunOutlierCounts {
                    executions: dataset.execution_count(run.id),
                    ..RunOutlierCounts::default()
                },
            );
        }

        for measurement in &dataset.measurements {
            let Some(aggregate) = aggregates.get(measurement.run_id, &measurement.metric) else {
                continue;
            };
            let Some(run_counts) = report.by_run.get_mut(&measurement.run_id) else {
                continue;
            };
            let metric_counts = report
                .by_metric
                .entry(measurement.metric.clone())
                .or_default();

            run_counts.measurements += 1;
            metric_counts.measurements += 1;

            let Some(outlier) = self.check(aggregate, measurement.execution_id, measurement.value)
            else {
                continue;
            };

            run_counts.outliers += 1;
            if measurement.metric.is_driver() {
                run_counts.driver_outliers += 1;
            }
            run_counts
                .metrics_with_outliers
                .insert(measurement.metric.name.clone());
            metric_counts.outliers += 1;
            *report
                .by_run_metric
                .entry((measurement.run_id, measurement.metric.clone()))
                .or_default() += 1;
            outlier_executions
                .entry(measurement.run_id)
                .or_default()
                .insert(measurement.execution_id);
            report.outliers.push(outlier);
        }

        for (run_id, executions) in outlier_executions {
            if let Some(counts) = report.by_run.get_mut(&run_id) {
                counts.outlier_executions = executions.len();
            }
        }

        report.outliers.sort_by(|a, b| {
            a.run_id
                .cmp(&b.run_id)
                .then_with(|| a.metric.cmp(&b.metric))
                .then(a.execution_id.cmp(&b.execution_id))
        });

        if !report.outliers.is_empty() {
            tracing::info!(
                "Detected {} outlier measurements (sigma={})",
                report.outliers.len(),
                self.sigma
            );
        }

        report
    }
}
