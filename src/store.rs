//! Read access to stored benchmark measurements
//!
//! `MeasurementStore` is the read contract the analysis depends on. The
//! bundled `SnapshotStore` serves a JSON document holding the four row
//! families (environments, runs, properties, measurements).

use crate::error::{BenchdiffError, Result};
use crate::model::{Environment, EnvironmentId, Snapshot};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Point-in-time read interface of a measurement store
pub trait MeasurementStore {
    /// Every environment known to the store
    fn environments(&self) -> Result<Vec<Environment>>;

    /// Rows belonging to the given environments only
    fn snapshot(&self, environment_ids: &[EnvironmentId]) -> Result<Snapshot>;
}

/// In-memory store loaded from a JSON snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshot: Snapshot,
}

impl SnapshotStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    /// Parse a JSON snapshot document
    pub fn from_json_str(content: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        tracing::debug!(
            environments = snapshot.environments.len(),
            runs = snapshot.runs.len(),
            measurements = snapshot.measurements.len(),
            "Parsed snapshot"
        );
        Ok(Self::new(snapshot))
    }

    /// Load a JSON snapshot file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BenchdiffError::SnapshotNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        tracing::info!("Loading snapshot from {}", path.display());
        Self::from_json_str(&content)
    }
}

impl MeasurementStore for SnapshotStore {
    fn environments(&self) -> Result<Vec<Environment>> {
        Ok(self.snapshot.environments.clone())
    }

    fn snapshot(&self, environment_ids: &[EnvironmentId]) -> Result<Snapshot> {
        let selected: BTreeSet<EnvironmentId> = environment_ids.iter().copied().collect();

        let environments = self
            .snapshot
            .environments
            .iter()
            .filter(|env| selected.contains(&env.id))
            .cloned()
            .collect();
        let runs: Vec<_> = self
            .snapshot
            .runs
            .iter()
            .filter(|run| selected.contains(&run.environment_id))
            .cloned()
            .collect();
        let run_ids: BTreeSet<_> = runs.iter().map(|run| run.id).collect();
        let properties = self
            .snapshot
            .properties
            .iter()
            .filter(|property| run_ids.contains(&property.run_id))
            .cloned()
            .collect();
        let measurements = self
            .snapshot
            .measurements
            .iter()
            .filter(|row| run_ids.contains(&row.run_id))
            .cloned()
            .collect();

        Ok(Snapshot {
            environments,
            runs,
            properties,
            measurements,
        })
    }
}

/// Translate an SQL `LIKE` pattern into an anchored regex
///
/// `%` matches any run of characters, `_` exactly one; everything else is
/// literal and case-sensitive.
///
/// # Example
/// ```
/// use benchdiff::store::like_to_regex;
///
/// let re = like_to_regex("prod-%").unwrap();
/// assert!(re.is_match("prod-east"));
/// assert!(!re.is_match("staging-prod-east"));
///
/// let re = like_to_regex("v_.0").unwrap();
/// assert!(re.is_match("v1.0"));
/// assert!(!re.is_match("v1x0"));
/// ```
pub fn like_to_regex(pattern: &str) -> Result<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("^(?s:");
    let mut literal = String::new();
    for c in pattern.chars() {
        match c {
            '%' | '_' => {
                expr.push_str(&regex::escape(&literal));
                literal.clear();
                expr.push_str(if c == '%' { ".*" } else { "." });
            }
            _ => literal.push(c),
        }
    }
    expr.push_str(&regex::escape(&literal));
    expr.push_str(")$");

    Regex::new(&expr).map_err(|e| BenchdiffError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

/// Environments matching any of `patterns`, ordered by name then id
pub fn resolve_environments<S>(store: &S, patterns: &[String]) -> Result<Vec<Environment>>
where
    S: MeasurementStore + ?Sized,
{
    let matchers = patterns
        .iter()
        .map(|pattern| like_to_regex(pattern.trim()))
        .collect::<Result<Vec<_>>>()?;

    let mut selected: BTreeMap<(String, EnvironmentId), Environment> = BTreeMap::new();
    for env in store.environments()? {
        if matchers.iter().any(|re| re.is_match(&env.name)) {
            selected.insert((env.name.clone(), env.id), env);
        }
    }

    if selected.is_empty() {
        return Err(BenchdiffError::NoEnvironments(patterns.join(",")));
    }

    let environments: Vec<_> = selected.into_values().collect();
    tracing::info!(
        "Selected environments: {}",
        environments
            .iter()
            .map(|env| env.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(environments)
}
