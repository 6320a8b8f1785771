//! The forward analysis pipeline
//!
//! snapshot → dataset → aggregates → (outliers | signatures) → matching →
//! diffs. Each stage is computed once; ranking and histograms are derived
//! from the diffs on demand.

use crate::aggregate::{aggregate_runs, AggregateIndex};
use crate::config::AnalysisConfig;
use crate::diff::{DiffEngine, RunDiff};
use crate::error::Result;
use crate::histogram::{build_histograms, Histogram};
use crate::matcher::{match_runs, RunMatching};
use crate::model::{Dataset, Snapshot};
use crate::outlier::{OutlierDetector, OutlierReport};
use crate::rank::{top_n, RankedDiff};
use crate::signature::build_signatures;
use crate::store::{resolve_environments, MeasurementStore};

/// Every derived table of one snapshot
#[derive(Debug, Clone)]
pub struct Analysis {
    pub dataset: Dataset,
    pub aggregates: AggregateIndex,
    pub outliers: OutlierReport,
    pub matching: RunMatching,
    pub diffs: Vec<RunDiff>,
}

impl Analysis {
    /// Run the whole pipeline over a snapshot
    pub fn run(snapshot: &Snapshot, config: &AnalysisConfig) -> Self {
        let dataset = Dataset::from_snapshot(snapshot);
        let aggregates = aggregate_runs(&dataset);
        let outliers = OutlierDetector::new(config.outliers.sigma).detect(&dataset, &aggregates);
        let signatures = build_signatures(&dataset);
        let matching = match_runs(&dataset, &signatures);
        let diffs = DiffEngine::from_config(config).compute(&dataset, &aggregates, &matching);

        tracing::info!(
            "Analyzed {} runs: {} aggregates, {} outliers, {} diffs",
            dataset.runs.len(),
            aggregates.len(),
            outliers.total(),
            diffs.len()
        );

        Self {
            dataset,
            aggregates,
            outliers,
            matching,
            diffs,
        }
    }

    /// Resolve `patterns` against `store`, read their rows and analyze them
    pub fn from_store<S>(store: &S, patterns: &[String], config: &AnalysisConfig) -> Result<Self>
    where
        S: MeasurementStore + ?Sized,
    {
        let environments = resolve_environments(store, patterns)?;
        let ids: Vec<_> = environments.iter().map(|env| env.id).collect();
        let snapshot = store.snapshot(&ids)?;
        Ok(Self::run(&snapshot, config))
    }

    pub fn significant_diffs(&self) -> impl Iterator<Item = &RunDiff> {
        self.diffs.iter().filter(|diff| diff.is_significant())
    }

    /// Top `n` significant diffs per metric
    pub fn top_diffs(&self, n: usize) -> Vec<RankedDiff<'_>> {
        top_n(&self.diffs, n)
    }

    pub fn histograms(&self, buckets: usize) -> Vec<Histogram> {
        build_histograms(&self.diffs, buckets)
    }
}
