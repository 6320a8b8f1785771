//! Benchmark data model: environments, runs, properties and measurements
//!
//! `Snapshot` is the raw read contract of the measurement store. `Dataset`
//! turns those flat rows into lookup maps in a single pass so every later
//! stage works on explicit composite keys.

use crate::metric::{normalize, MetricKey, Unit};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub type EnvironmentId = u64;
pub type RunId = u64;
pub type ExecutionId = u64;

/// A named deployment/configuration under benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub id: EnvironmentId,
    pub name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

/// Lifecycle status of a benchmark run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Started,
    Ended,
    Failed,
}

impl RunStatus {
    /// Only ended runs are eligible for aggregation and matching
    pub fn is_ended(self) -> bool {
        self == RunStatus::Ended
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RunStatus::Started => "STARTED",
            RunStatus::Ended => "ENDED",
            RunStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One benchmark run inside one environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub id: RunId,
    pub environment_id: EnvironmentId,
    pub status: RunStatus,
    /// Repetition index of the benchmark sequence this run belongs to
    #[serde(default)]
    pub sequence_id: String,
}

/// Whether a property is fixed descriptive metadata or a parametrized input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Attribute,
    Variable,
}

/// A single `name=value` property row of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunProperty {
    pub run_id: RunId,
    pub kind: PropertyKind,
    pub name: String,
    pub value: String,
}

/// A single raw observation as stored: one metric of one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub run_id: RunId,
    pub execution_id: ExecutionId,
    /// Raw metric identifier, e.g. `prestoQuery-cpuTime`
    pub metric: String,
    pub unit: Unit,
    pub value: f64,
}

/// Point-in-time read of the measurement store for a set of environments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub environments: Vec<Environment>,
    #[serde(default)]
    pub runs: Vec<BenchmarkRun>,
    #[serde(default)]
    pub properties: Vec<RunProperty>,
    #[serde(default)]
    pub measurements: Vec<MeasurementRow>,
}

/// A run's attributes and variables in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProperties {
    pub attributes: Vec<(String, String)>,
    pub variables: Vec<(String, String)>,
}

impl RunProperties {
    /// First value of `name`, attributes taking precedence over variables
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .chain(self.variables.iter())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.variables.is_empty()
    }
}

/// A measurement with its metric identifier normalized
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub run_id: RunId,
    pub execution_id: ExecutionId,
    pub metric: MetricKey,
    pub unit: Unit,
    pub value: f64,
}

/// Indexed, normalized view over a snapshot
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub environments: BTreeMap<EnvironmentId, Environment>,
    pub runs: BTreeMap<RunId, BenchmarkRun>,
    pub properties: BTreeMap<RunId, RunProperties>,
    pub measurements: Vec<Measurement>,
    /// Distinct executions per run, including runs that are not ended
    pub executions: BTreeMap<RunId, BTreeSet<ExecutionId>>,
}

impl Dataset {
    /// Build lookup maps from the flat snapshot rows
    ///
    /// Rows that reference unknown runs or environments are dropped with a
    /// warning rather than failing the analysis.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let environments: BTreeMap<_, _> = snapshot
            .environments
            .iter()
            .map(|env| (env.id, env.clone()))
            .collect();

        let mut runs = BTreeMap::new();
        for run in &snapshot.runs {
            if !environments.contains_key(&run.environment_id) {
                tracing::warn!(
                    "Dropping run {} of unknown environment {}",
                    run.id,
                    run.environment_id
                );
                continue;
            }
            runs.insert(run.id, run.clone());
        }

        let mut properties: BTreeMap<RunId, RunProperties> = BTreeMap::new();
        for property in &snapshot.properties {
            if !runs.contains_key(&property.run_id) {
                continue;
            }
            let entry = properties.entry(property.run_id).or_default();
            let pair = (property.name.clone(), property.value.clone());
            match property.kind {
                PropertyKind::Attribute => entry.attributes.push(pair),
                PropertyKind::Variable => entry.variables.push(pair),
            }
        }

        let mut measurements = Vec::with_capacity(snapshot.measurements.len());
        let mut executions: BTreeMap<RunId, BTreeSet<ExecutionId>> = BTreeMap::new();
        let mut dropped = 0usize;
        for row in &snapshot.measurements {
            if !runs.contains_key(&row.run_id) {
                dropped += 1;
                continue;
            }
            executions
                .entry(row.run_id)
                .or_default()
                .insert(row.execution_id);
            measurements.push(Measurement {
                run_id: row.run_id,
                execution_id: row.execution_id,
                metric: normalize(&row.metric),
                unit: row.unit.clone(),
                value: row.value,
            });
        }
        if dropped > 0 {
            tracing::warn!("Dropped {} measurements of unknown runs", dropped);
        }

        tracing::debug!(
            environments = environments.len(),
            runs = runs.len(),
            measurements = measurements.len(),
            "Indexed snapshot"
        );

        Self {
            environments,
            runs,
            properties,
            measurements,
            executions,
        }
    }

    pub fn environment_name(&self, id: EnvironmentId) -> &str {
        self.environments
            .get(&id)
            .map(|env| env.name.as_str())
            .unwrap_or("")
    }

    /// Environment name of the environment owning `run_id`
    pub fn run_environment_name(&self, run_id: RunId) -> &str {
        self.runs
            .get(&run_id)
            .map(|run| self.environment_name(run.environment_id))
            .unwrap_or("")
    }

    pub fn run_properties(&self, run_id: RunId) -> Option<&RunProperties> {
        self.properties.get(&run_id)
    }

    pub fn ended_runs(&self) -> impl Iterator<Item = &BenchmarkRun> {
        self.runs.values().filter(|run| run.status.is_ended())
    }

    pub fn execution_count(&self, run_id: RunId) -> usize {
        self.executions.get(&run_id).map_or(0, BTreeSet::len)
    }

    /// Environments ordered by name, then id
    pub fn environments_by_name(&self) -> Vec<&Environment> {
        let mut envs: Vec<_> = self.environments.values().collect();
        envs.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        envs
    }
}
