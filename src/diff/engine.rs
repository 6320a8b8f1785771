// Diff computation over matched run pairs

use crate::aggregate::{AggregateIndex, Summary};
use crate::config::AnalysisConfig;
use crate::diff::tolerance::ToleranceBand;
use crate::matcher::RunMatching;
use crate::metric::{MetricKey, Unit};
use crate::model::{Dataset, Environment, EnvironmentId, RunId};
use serde::Serialize;

/// Numeric comparison of two summaries
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiffStats {
    /// `right.mean - left.mean`
    pub diff: f64,
    /// `100 * diff / max(left.mean, right.mean)`; `None` on a zero denominator
    pub diff_pct: Option<f64>,
    /// Either mean lies outside the other side's tolerance band
    pub significant: bool,
}

impl DiffStats {
    /// Compare `right` against `left`
    ///
    /// # Example
    /// ```
    /// use benchdiff::aggregate::Summary;
    /// use benchdiff::diff::DiffStats;
    ///
    /// let left = Summary { count: 3, mean: 100.0, min: 98.0, max: 102.0, stddev: Some(2.0) };
    /// let right = Summary { count: 3, mean: 120.0, min: 117.0, max: 123.0, stddev: Some(3.0) };
    ///
    /// let stats = DiffStats::between(&left, &right, 0.05);
    /// assert_eq!(stats.diff, 20.0);
    /// assert!((stats.diff_pct.unwrap() - 16.666_666).abs() < 1e-4);
    /// assert!(stats.significant);
    /// ```
    pub fn between(left: &Summary, right: &Summary, tolerance_floor: f64) -> Self {
        let diff = right.mean - left.mean;

        let denominator = left.mean.max(right.mean);
        let diff_pct = if denominator == 0.0 {
            None
        } else {
            Some(100.0 * diff / denominator).filter(|pct| pct.is_finite())
        };

        let left_band = ToleranceBand::for_summary(left, tolerance_floor);
        let right_band = ToleranceBand::for_summary(right, tolerance_floor);
        let significant = !right_band.contains(left.mean) || !left_band.contains(right.mean);

        Self {
            diff,
            diff_pct,
            significant,
        }
    }
}

/// One metric compared between two matched runs in two environments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDiff {
    pub left_environment_id: EnvironmentId,
    pub left_environment: String,
    pub right_environment_id: EnvironmentId,
    pub right_environment: String,
    pub left_run_id: RunId,
    pub right_run_id: RunId,
    pub benchmark_name: String,
    pub query_name: String,
    /// Property signature label shared by both runs
    pub properties: String,
    /// Short digest of the shared signature, stable across reports
    pub signature_id: String,
    pub metric: MetricKey,
    pub unit: Unit,
    pub left: Summary,
    pub right: Summary,
    pub stats: DiffStats,
}

impl RunDiff {
    pub fn diff_pct(&self) -> Option<f64> {
        self.stats.diff_pct
    }

    pub fn is_significant(&self) -> bool {
        self.stats.significant
    }
}

/// Computes diffs for every environment pair under comparison
#[derive(Debug, Clone)]
pub struct DiffEngine {
    tolerance_floor: f64,
    benchmark_property: String,
    query_property: String,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl DiffEngine {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            tolerance_floor: config.diff.tolerance_floor,
            benchmark_property: config.properties.benchmark.clone(),
            query_property: config.properties.query.clone(),
        }
    }

    pub fn tolerance_floor(&self) -> f64 {
        self.tolerance_floor
    }

    /// Diff every shared metric of every matched run pair
    ///
    /// Only pairs inside one signature group are generated, never a full
    /// cross join of runs. Output order: environment pair, signature, left
    /// run, right run, metric.
    pub fn compute(
        &self,
        dataset: &Dataset,
        aggregates: &AggregateIndex,
        matching: &RunMatching,
    ) -> Vec<RunDiff> {
        let environments = dataset.environments_by_name();
        let mut diffs = Vec::new();

        for (i, left_env) in environments.iter().enumerate() {
            for right_env in &environments[i + 1..] {
                let before = diffs.len();
                self.compute_pair(left_env, right_env, aggregates, matching, &mut diffs);
                tracing::debug!(
                    "{} vs {}: {} diffs",
                    left_env.name,
                    right_env.name,
                    diffs.len() - before
                );
            }
        }

        diffs
    }

    fn compute_pair(
        &self,
        left_env: &Environment,
        right_env: &Environment,
        aggregates: &AggregateIndex,
        matching: &RunMatching,
        diffs: &mut Vec<RunDiff>,
    ) {
        for group in matching.comparable_groups() {
            let left_runs = group.runs_in(left_env.id);
            let right_runs = group.runs_in(right_env.id);
            if left_runs.is_empty() || right_runs.is_empty() {
                continue;
            }

            let benchmark_name = group
                .signature
                .get(&self.benchmark_property)
                .unwrap_or_default()
                .to_string();
            let query_name = group
                .signature
                .get(&self.query_property)
                .unwrap_or_default()
                .to_string();
            let properties = group.signature.label();
            let signature_id = group.signature.short_id();

            for &left_run_id in left_runs {
                for &right_run_id in right_runs {
                    for left in aggregates.for_run(left_run_id) {
                        let Some(right) = aggregates.get(right_run_id, &left.metric) else {
                            continue;
                        };
                        if left.unit != right.unit {
                            tracing::warn!(
                                "Skipping {} between runs {} and {}: units {} and {} differ",
                                left.metric,
                                left_run_id,
                                right_run_id,
                                left.unit,
                                right.unit
                            );
                            continue;
                        }

                        diffs.push(RunDiff {
                            left_environment_id: left_env.id,
                            left_environment: left_env.name.clone(),
                            right_environment_id: right_env.id,
                            right_environment: right_env.name.clone(),
                            left_run_id,
                            right_run_id,
                            benchmark_name: benchmark_name.clone(),
                            query_name: query_name.clone(),
                            properties: properties.clone(),
                            signature_id: signature_id.clone(),
                            metric: left.metric.clone(),
                            unit: left.unit.clone(),
                            left: left.summary,
                            right: right.summary,
                            stats: DiffStats::between(
                                &left.summary,
                                &right.summary,
                                self.tolerance_floor,
                            ),
                        });
                    }
                }
            }
        }
    }
}
