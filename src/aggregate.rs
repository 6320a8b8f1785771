//! Per-run, per-metric summary statistics
//!
//! Every `(run, metric)` pair of an ended run is reduced to mean/min/max and
//! the *sample* standard deviation (n - 1 denominator). The standard
//! deviation of a single execution is undefined and stays `None`; it is
//! never reported as zero.

use crate::metric::{MetricKey, Unit};
use crate::model::{Dataset, ExecutionId, RunId};
use rayon::prelude::*;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Descriptive statistics of one sample set
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation; `None` for fewer than two samples
    pub stddev: Option<f64>,
}

impl Summary {
    /// Summarize samples, `None` when there are none
    ///
    /// # Example
    /// ```
    /// use benchdiff::aggregate::Summary;
    ///
    /// let summary = Summary::from_samples(&[98.0, 100.0, 102.0]).unwrap();
    /// assert_eq!(summary.mean, 100.0);
    /// assert_eq!(summary.stddev, Some(2.0));
    ///
    /// let single = Summary::from_samples(&[50.0]).unwrap();
    /// assert_eq!(single.stddev, None);
    /// ```
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let stddev = if samples.len() < 2 {
            None
        } else {
            Some(Statistics::std_dev(samples)).filter(|s| s.is_finite())
        };

        Some(Self {
            count: samples.len(),
            mean: Statistics::mean(samples),
            min: Statistics::min(samples),
            max: Statistics::max(samples),
            stddev,
        })
    }
}

/// Aggregate of one metric over all executions of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunAggregate {
    pub run_id: RunId,
    pub metric: MetricKey,
    pub unit: Unit,
    pub summary: Summary,
}

impl RunAggregate {
    pub fn mean(&self) -> f64 {
        self.summary.mean
    }

    pub fn stddev(&self) -> Option<f64> {
        self.summary.stddev
    }
}

/// All run aggregates, keyed by run then metric
#[derive(Debug, Clone, Default)]
pub struct AggregateIndex {
    by_run: BTreeMap<RunId, BTreeMap<MetricKey, RunAggregate>>,
}

impl AggregateIndex {
    pub fn get(&self, run_id: RunId, metric: &MetricKey) -> Option<&RunAggregate> {
        self.by_run.get(&run_id)?.get(metric)
    }

    /// Aggregates of one run in metric order
    pub fn for_run(&self, run_id: RunId) -> impl Iterator<Item = &RunAggregate> {
        self.by_run
            .get(&run_id)
            .into_iter()
            .flat_map(|metrics| metrics.values())
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunAggregate> {
        self.by_run.values().flat_map(|metrics| metrics.values())
    }

    pub fn len(&self) -> usize {
        self.by_run.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_run.is_empty()
    }
}

struct SampleGroup {
    run_id: RunId,
    metric: MetricKey,
    unit: Unit,
    samples: Vec<(ExecutionId, f64)>,
}

/// Compute aggregates for every `(run, metric)` of the ended runs
///
/// Samples are ordered by execution id before reduction so the result is
/// identical regardless of input row order.
pub fn aggregate_runs(dataset: &Dataset) -> AggregateIndex {
    let mut groups: BTreeMap<(RunId, MetricKey), SampleGroup> = BTreeMap::new();

    for measurement in &dataset.measurements {
        let Some(run) = dataset.runs.get(&measurement.run_id) else {
            continue;
        };
        if !run.status.is_ended() {
            continue;
        }

        let group = groups
            .entry((measurement.run_id, measurement.metric.clone()))
            .or_insert_with(|| SampleGroup {
                run_id: measurement.run_id,
                metric: measurement.metric.clone(),
                unit: measurement.unit.clone(),
                samples: Vec::new(),
            });
        if group.unit != measurement.unit {
            tracing::warn!(
                "Run {} metric {} mixes units {} and {}, keeping {}",
                group.run_id,
                group.metric,
                group.unit,
                measurement.unit,
                group.unit
            );
        }
        group
            .samples
            .push((measurement.execution_id, measurement.value));
    }

    let groups: Vec<SampleGroup> = groups.into_values().collect();
    let aggregates: Vec<RunAggregate> = groups
        .into_par_iter()
        .filter_map(|mut group| {
            group
                .samples
                .sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
            let values: Vec<f64> = group.samples.iter().map(|(_, value)| *value).collect();
            let summary = Summary::from_samples(&values)?;
            Some(RunAggregate {
                run_id: group.run_id,
                metric: group.metric,
                unit: group.unit,
                summary,
            })
        })
        .collect();

    let mut index = AggregateIndex::default();
    for aggregate in aggregates {
        index
            .by_run
            .entry(aggregate.run_id)
            .or_default()
            .insert(aggregate.metric.clone(), aggregate);
    }

    tracing::debug!("Computed {} run aggregates", index.len());
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::SnapshotBuilder;
    use crate::model::RunStatus;

    fn dataset(builder: SnapshotBuilder) -> Dataset {
        Dataset::from_snapshot(&builder.build())
    }

    #[test]
    fn test_summary_basic() {
        let summary = Summary::from_samples(&[98.0, 100.0, 102.0]).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 100.0);
        assert_eq!(summary.min, 98.0);
        assert_eq!(summary.max, 102.0);
        // Sample stddev: sqrt((4 + 0 + 4) / 2) = 2
        assert!((summary.stddev.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_empty_is_undefined() {
        assert!(Summary::from_samples(&[]).is_none());
    }

    #[test]
    fn test_summary_single_sample_has_no_stddev() {
        let summary = Summary::from_samples(&[50.0]).unwrap();
        assert_eq!(summary.mean, 50.0);
        assert_eq!(summary.min, 50.0);
        assert_eq!(summary.max, 50.0);
        assert_eq!(summary.stddev, None);
    }

    #[test]
    fn test_summary_constant_samples() {
        let summary = Summary::from_samples(&[7.0, 7.0, 7.0, 7.0]).unwrap();
        assert_eq!(summary.mean, 7.0);
        assert_eq!(summary.stddev, Some(0.0));
    }

    #[test]
    fn test_aggregate_runs_groups_by_run_and_metric() {
        let dataset = dataset(
            SnapshotBuilder::new()
                .environment(1, "a")
                .run(10, 1, RunStatus::Ended)
                .samples(10, "duration", "MILLISECONDS", &[98.0, 100.0, 102.0])
                .samples(10, "cluster-cpu", "PERCENT", &[10.0, 20.0]),
        );

        let index = aggregate_runs(&dataset);
        assert_eq!(index.len(), 2);

        let duration = index.get(10, &MetricKey::new("driver", "duration")).unwrap();
        assert_eq!(duration.mean(), 100.0);
        assert_eq!(duration.unit, Unit::Milliseconds);

        let cpu = index.get(10, &MetricKey::new("cluster", "cpu")).unwrap();
        assert_eq!(cpu.summary.count, 2);
        assert_eq!(cpu.mean(), 15.0);
    }

    #[test]
    fn test_aggregate_runs_skips_runs_not_ended() {
        let dataset = dataset(
            SnapshotBuilder::new()
                .environment(1, "a")
                .run(10, 1, RunStatus::Failed)
                .run(11, 1, RunStatus::Started)
                .samples(10, "duration", "MILLISECONDS", &[1.0, 2.0])
                .samples(11, "duration", "MILLISECONDS", &[1.0, 2.0]),
        );

        assert!(aggregate_runs(&dataset).is_empty());
    }

    #[test]
    fn test_aggregate_runs_missing_metric_is_none() {
        let dataset = dataset(
            SnapshotBuilder::new()
                .environment(1, "a")
                .run(10, 1, RunStatus::Ended)
                .samples(10, "duration", "MILLISECONDS", &[1.0]),
        );

        let index = aggregate_runs(&dataset);
        assert!(index.get(10, &MetricKey::new("driver", "memory")).is_none());
        assert!(index.get(99, &MetricKey::new("driver", "duration")).is_none());
    }

    #[test]
    fn test_aggregate_runs_is_order_independent() {
        let forward = dataset(
            SnapshotBuilder::new()
                .environment(1, "a")
                .run(10, 1, RunStatus::Ended)
                .samples(10, "duration", "MILLISECONDS", &[0.1, 0.2, 0.3, 1e9]),
        );
        let mut reversed_snapshot = SnapshotBuilder::new()
            .environment(1, "a")
            .run(10, 1, RunStatus::Ended)
            .samples(10, "duration", "MILLISECONDS", &[0.1, 0.2, 0.3, 1e9])
            .build();
        reversed_snapshot.measurements.reverse();
        let reversed = Dataset::from_snapshot(&reversed_snapshot);

        let key = MetricKey::new("driver", "duration");
        let a = aggregate_runs(&forward);
        let b = aggregate_runs(&reversed);
        assert_eq!(
            a.get(10, &key).unwrap().summary.mean.to_bits(),
            b.get(10, &key).unwrap().summary.mean.to_bits()
        );
    }
}
