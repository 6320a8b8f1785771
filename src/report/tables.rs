// Row types and builders of the individual reports

use super::format::{format_diff_pct, format_range, format_value};
use super::{Cell, Table, TableRow};
use crate::analysis::Analysis;
use crate::config::AnalysisConfig;
use crate::diff::RunDiff;
use crate::histogram::{Histogram, HistogramBucket};
use crate::matcher::EnvironmentHealth;
use crate::model::{EnvironmentId, RunStatus};
use crate::rank::RankedDiff;
use crate::signature::PropertySignature;
use std::collections::{BTreeMap, BTreeSet};

/// Data-quality summary of runs sharing environment, attributes and sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationRow {
    pub environment: String,
    pub attributes: String,
    pub sequence_id: String,
    pub statuses: BTreeSet<RunStatus>,
    pub runs: usize,
    pub executions: usize,
    pub invalid_executions: usize,
    pub outliers: usize,
    pub driver_outliers: usize,
    pub outlier_executions: usize,
    pub metrics_with_outliers: BTreeSet<String>,
}

impl TableRow for ValidationRow {
    const COLUMNS: &'static [&'static str] = &[
        "environment",
        "attributes_label",
        "sequence_id",
        "statuses_label",
        "runs_num",
        "executions_num",
        "invalid_executions_num",
        "outliers_num",
        "driver_outliers_num",
        "metrics_with_outliers_label",
        "outlier_executions_num",
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut statuses: Vec<&str> = self.statuses.iter().map(|s| s.as_str()).collect();
        statuses.sort_unstable();
        let metrics: Vec<&str> = self.metrics_with_outliers.iter().map(String::as_str).collect();
        vec![
            self.environment.as_str().into(),
            self.attributes.as_str().into(),
            self.sequence_id.as_str().into(),
            statuses.join(", ").into(),
            self.runs.into(),
            self.executions.into(),
            self.invalid_executions.into(),
            self.outliers.into(),
            self.driver_outliers.into(),
            metrics.join(", ").into(),
            self.outlier_executions.into(),
        ]
    }
}

pub(super) fn validation_table(analysis: &Analysis) -> Table {
    let dataset = &analysis.dataset;
    let mut groups: BTreeMap<(String, EnvironmentId, String, String), ValidationRow> =
        BTreeMap::new();

    for run in dataset.runs.values() {
        let environment = dataset.environment_name(run.environment_id).to_string();
        let attributes = dataset
            .run_properties(run.id)
            .map(|props| PropertySignature::from_pairs(props.attributes.iter().cloned()).label())
            .unwrap_or_default();

        let row = groups
            .entry((
                environment.clone(),
                run.environment_id,
                attributes.clone(),
                run.sequence_id.clone(),
            ))
            .or_insert_with(|| ValidationRow {
                environment,
                attributes,
                sequence_id: run.sequence_id.clone(),
                ..ValidationRow::default()
            });

        let executions = dataset.execution_count(run.id);
        row.statuses.insert(run.status);
        row.runs += 1;
        row.executions += executions;
        if !run.status.is_ended() {
            row.invalid_executions += executions;
        }
        if let Some(counts) = analysis.outliers.run_counts(run.id) {
            row.outliers += counts.outliers;
            row.driver_outliers += counts.driver_outliers;
            row.outlier_executions += counts.outlier_executions;
            row.metrics_with_outliers
                .extend(counts.metrics_with_outliers.iter().cloned());
        }
    }

    Table::from_rows(
        "Validation",
        "Runs per environment, attributes and sequence, with outlier counts",
        groups.into_values(),
    )
}

/// Matching health of one environment
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRow<'a> {
    pub health: &'a EnvironmentHealth,
}

impl TableRow for HealthRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "environment",
        "runs_num",
        "invalid_runs_num",
        "comparable_num",
        "missing_num",
        "extra_num",
    ];

    fn cells(&self) -> Vec<Cell> {
        let h = self.health;
        vec![
            h.environment.as_str().into(),
            h.total_runs.into(),
            h.invalid_runs.into(),
            h.comparable.into(),
            h.missing.into(),
            h.extra.into(),
        ]
    }
}

pub(super) fn health_table(analysis: &Analysis) -> Table {
    Table::from_rows(
        "Environment Health",
        "Benchmark configurations comparable with, missing from or extra to each environment",
        analysis
            .matching
            .health
            .iter()
            .map(|health| HealthRow { health }),
    )
}

/// One metric of one matched run pair
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRow<'a> {
    pub diff: &'a RunDiff,
}

const DIFF_COLUMNS: [&str; 18] = [
    "left_environment",
    "right_environment",
    "benchmark_name",
    "query_name",
    "properties_label",
    "signature_id",
    "metric",
    "metric_scope",
    "unit_group",
    "diff_label",
    "diff_pct_label",
    "left_mean_unit",
    "left_mean_err",
    "left_range_label",
    "right_mean_unit",
    "right_mean_err",
    "right_range_label",
    "significant_label",
];

impl TableRow for DiffRow<'_> {
    const COLUMNS: &'static [&'static str] = &DIFF_COLUMNS;

    fn cells(&self) -> Vec<Cell> {
        let d = self.diff;
        vec![
            d.left_environment.as_str().into(),
            d.right_environment.as_str().into(),
            d.benchmark_name.as_str().into(),
            d.query_name.as_str().into(),
            d.properties.as_str().into(),
            d.signature_id.as_str().into(),
            d.metric.name.as_str().into(),
            d.metric.scope.as_str().into(),
            d.unit.as_str().into(),
            format_value(&d.unit, Some(d.stats.diff)).into(),
            format_diff_pct(d.diff_pct()).into(),
            d.left.mean.into(),
            d.left.stddev.into(),
            format_range(&d.unit, d.left.min, d.left.max).into(),
            d.right.mean.into(),
            d.right.stddev.into(),
            format_range(&d.unit, d.right.min, d.right.max).into(),
            if d.is_significant() { "yes" } else { "no" }.into(),
        ]
    }
}

pub(super) fn diff_table(analysis: &Analysis) -> Table {
    Table::from_rows(
        "Diffs",
        "Every shared metric of every matched run pair, right compared to left",
        analysis.diffs.iter().map(|diff| DiffRow { diff }),
    )
}

/// A ranked significant diff
#[derive(Debug, Clone, PartialEq)]
pub struct TopRow<'a> {
    pub ranked: RankedDiff<'a>,
}

impl TableRow for TopRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "rank_num",
        "left_environment",
        "right_environment",
        "benchmark_name",
        "query_name",
        "properties_label",
        "signature_id",
        "metric",
        "metric_scope",
        "unit_group",
        "diff_label",
        "diff_pct_label",
        "left_mean_unit",
        "left_mean_err",
        "left_range_label",
        "right_mean_unit",
        "right_mean_err",
        "right_range_label",
        "significant_label",
    ];

    fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![self.ranked.rank.into()];
        cells.extend(DiffRow { diff: self.ranked.diff }.cells());
        cells
    }
}

pub(super) fn top_table(analysis: &Analysis, config: &AnalysisConfig) -> Table {
    let top_n = config.rank.top_n;
    Table::from_rows(
        &format!("Top {} Diffs", top_n),
        "Largest significant diff percentages per metric",
        analysis
            .top_diffs(top_n)
            .into_iter()
            .map(|ranked| TopRow { ranked }),
    )
}

/// One bucket of one histogram
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramRow<'a> {
    pub histogram: &'a Histogram,
    pub bucket: &'a HistogramBucket,
    pub bar_width: usize,
}

impl TableRow for HistogramRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "metric",
        "scope_label",
        "unit_group",
        "bucket",
        "diff_pct_range",
        "occurrences_num",
        "bar_chart_label",
    ];

    fn cells(&self) -> Vec<Cell> {
        let dimension = &self.histogram.dimension;
        vec![
            dimension.metric.name.as_str().into(),
            dimension.metric.scope.as_str().into(),
            dimension.unit.as_str().into(),
            self.bucket.bucket.into(),
            self.bucket.range_label().into(),
            self.bucket.occurrences.into(),
            self.bucket.bar(self.bar_width).into(),
        ]
    }
}

pub(super) fn histogram_table(analysis: &Analysis, config: &AnalysisConfig) -> Table {
    let histograms = analysis.histograms(config.histogram.buckets);
    let bar_width = config.histogram.bar_width;
    Table::from_rows(
        "Diff Histogram",
        "Distribution of diff percentages per metric",
        histograms.iter().flat_map(|histogram| {
            histogram.buckets.iter().map(move |bucket| HistogramRow {
                histogram,
                bucket,
                bar_width,
            })
        }),
    )
}

/// Aggregate of one metric of one ended run
#[derive(Debug, Clone, PartialEq)]
pub struct RunDetailRow {
    pub run_id: u64,
    pub environment: String,
    pub sequence_id: String,
    pub properties: String,
    pub signature_id: String,
    pub metric: String,
    pub scope: String,
    pub unit: String,
    pub executions: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub stddev: Option<f64>,
    pub outliers: usize,
}

impl TableRow for RunDetailRow {
    const COLUMNS: &'static [&'static str] = &[
        "run_id",
        "environment",
        "sequence_id",
        "properties_label",
        "signature_id",
        "metric",
        "scope_label",
        "unit_group",
        "executions_num",
        "mean_unit",
        "min_unit",
        "max_unit",
        "stddev_err",
        "outliers_num",
    ];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.run_id.into(),
            self.environment.as_str().into(),
            self.sequence_id.as_str().into(),
            self.properties.as_str().into(),
            self.signature_id.as_str().into(),
            self.metric.as_str().into(),
            self.scope.as_str().into(),
            self.unit.as_str().into(),
            self.executions.into(),
            self.mean.into(),
            self.min.into(),
            self.max.into(),
            self.stddev.into(),
            self.outliers.into(),
        ]
    }
}

pub(super) fn run_detail_table(analysis: &Analysis) -> Table {
    let dataset = &analysis.dataset;
    let rows = analysis.aggregates.iter().filter_map(|aggregate| {
        let run = dataset.runs.get(&aggregate.run_id)?;
        let (properties, signature_id) = analysis
            .matching
            .signature_of(run.id)
            .map(|signature| (signature.label(), signature.short_id()))
            .unwrap_or_default();
        Some(RunDetailRow {
            run_id: run.id,
            environment: dataset.environment_name(run.environment_id).to_string(),
            sequence_id: run.sequence_id.clone(),
            properties,
            signature_id,
            metric: aggregate.metric.name.clone(),
            scope: aggregate.metric.scope.clone(),
            unit: aggregate.unit.to_string(),
            executions: aggregate.summary.count,
            mean: aggregate.summary.mean,
            min: aggregate.summary.min,
            max: aggregate.summary.max,
            stddev: aggregate.summary.stddev,
            outliers: analysis.outliers.count_for(run.id, &aggregate.metric),
        })
    });

    Table::from_rows(
        "Run Details",
        "Per-run metric aggregates over all executions",
        rows,
    )
}

/// One displayed attribute of an environment
#[derive(Debug, Clone, PartialEq)]
pub struct EnvironmentDetailRow {
    pub environment: String,
    pub attribute: String,
    pub value: String,
}

impl TableRow for EnvironmentDetailRow {
    const COLUMNS: &'static [&'static str] = &["environment", "attribute", "value"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            self.environment.as_str().into(),
            self.attribute.as_str().into(),
            self.value.as_str().into(),
        ]
    }
}

pub(super) fn environment_detail_table(analysis: &Analysis, config: &AnalysisConfig) -> Table {
    let hidden: BTreeSet<&str> = config
        .properties
        .hidden_attributes
        .iter()
        .map(String::as_str)
        .collect();
    let hidden = &hidden;

    let rows = analysis
        .dataset
        .environments_by_name()
        .into_iter()
        .flat_map(move |env| {
            env.attributes
                .iter()
                .filter(move |(name, _)| !hidden.contains(name.as_str()))
                .map(move |(name, value)| EnvironmentDetailRow {
                    environment: env.name.clone(),
                    attribute: name.clone(),
                    value: value.clone(),
                })
        })
        .collect::<Vec<_>>();

    Table::from_rows(
        "Environment Details",
        "Attributes of the compared environments",
        rows,
    )
}
