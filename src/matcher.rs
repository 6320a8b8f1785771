//! Cross-environment run matching by property signature
//!
//! Eligible runs are indexed `signature → environment → runs`. A signature
//! seen in two or more environments forms a comparable group; one seen in a
//! single environment is "extra" there and "missing" everywhere else.

use crate::model::{Dataset, EnvironmentId, RunId};
use crate::signature::PropertySignature;
use serde::Serialize;
use std::collections::BTreeMap;

/// Classification of a signature group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    /// Observed in two or more environments
    Comparable,
    /// Observed in exactly one environment
    Extra,
}

/// Runs sharing one property signature, by environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableGroup {
    pub signature: PropertySignature,
    /// Environment → run ids (ascending)
    pub runs: BTreeMap<EnvironmentId, Vec<RunId>>,
}

impl ComparableGroup {
    /// Number of environments the group spans
    pub fn span(&self) -> usize {
        self.runs.len()
    }

    pub fn kind(&self) -> GroupKind {
        if self.span() >= 2 {
            GroupKind::Comparable
        } else {
            GroupKind::Extra
        }
    }

    pub fn is_comparable(&self) -> bool {
        self.kind() == GroupKind::Comparable
    }

    pub fn contains_environment(&self, environment_id: EnvironmentId) -> bool {
        self.runs.contains_key(&environment_id)
    }

    pub fn runs_in(&self, environment_id: EnvironmentId) -> &[RunId] {
        self.runs
            .get(&environment_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All `(run_id, environment_id)` members
    pub fn members(&self) -> Vec<(RunId, EnvironmentId)> {
        self.runs
            .iter()
            .flat_map(|(&env, runs)| runs.iter().map(move |&run| (run, env)))
            .collect()
    }
}

/// Matching health of one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentHealth {
    pub environment_id: EnvironmentId,
    pub environment: String,
    pub total_runs: usize,
    /// Runs whose status is not `ENDED`
    pub invalid_runs: usize,
    /// Signatures of this environment shared with another environment
    pub comparable: usize,
    /// Signatures seen elsewhere but not here
    pub missing: usize,
    /// Signatures seen only here
    pub extra: usize,
}

/// Outcome of matching all eligible runs
#[derive(Debug, Clone, Default)]
pub struct RunMatching {
    /// Groups ordered by signature
    pub groups: Vec<ComparableGroup>,
    /// Health per environment, ordered by environment name
    pub health: Vec<EnvironmentHealth>,
    signatures: BTreeMap<RunId, PropertySignature>,
}

impl RunMatching {
    pub fn comparable_groups(&self) -> impl Iterator<Item = &ComparableGroup> {
        self.groups.iter().filter(|group| group.is_comparable())
    }

    pub fn signature_of(&self, run_id: RunId) -> Option<&PropertySignature> {
        self.signatures.get(&run_id)
    }

    pub fn health_of(&self, environment_id: EnvironmentId) -> Option<&EnvironmentHealth> {
        self.health
            .iter()
            .find(|health| health.environment_id == environment_id)
    }
}

/// Group runs by signature and compute per-environment health
pub fn match_runs(
    dataset: &Dataset,
    signatures: &BTreeMap<RunId, PropertySignature>,
) -> RunMatching {
    let mut index: BTreeMap<&PropertySignature, BTreeMap<EnvironmentId, Vec<RunId>>> =
        BTreeMap::new();

    for (&run_id, signature) in signatures {
        let Some(run) = dataset.runs.get(&run_id) else {
            continue;
        };
        if !run.status.is_ended() {
            continue;
        }
        index
            .entry(signature)
            .or_default()
            .entry(run.environment_id)
            .or_default()
            .push(run_id);
    }

    let groups: Vec<ComparableGroup> = index
        .into_iter()
        .map(|(signature, mut runs)| {
            for ids in runs.values_mut() {
                ids.sort_unstable();
            }
            ComparableGroup {
                signature: signature.clone(),
                runs,
            }
        })
        .collect();

    let health = dataset
        .environments_by_name()
        .into_iter()
        .map(|env| {
            let env_runs = dataset
                .runs
                .values()
                .filter(|run| run.environment_id == env.id);
            let (mut total_runs, mut invalid_runs) = (0, 0);
            for run in env_runs {
                total_runs += 1;
                if !run.status.is_ended() {
                    invalid_runs += 1;
                }
            }

            let (mut comparable, mut missing, mut extra) = (0, 0, 0);
            for group in &groups {
                match (group.contains_environment(env.id), group.kind()) {
                    (true, GroupKind::Comparable) => comparable += 1,
                    (true, GroupKind::Extra) => extra += 1,
                    (false, _) => missing += 1,
                }
            }

            EnvironmentHealth {
                environment_id: env.id,
                environment: env.name.clone(),
                total_runs,
                invalid_runs,
                comparable,
                missing,
                extra,
            }
        })
        .collect();

    let comparable_count = groups.iter().filter(|g| g.is_comparable()).count();
    tracing::debug!(
        "Matched {} signatures, {} comparable across environments",
        groups.len(),
        comparable_count
    );

    RunMatching {
        groups,
        health,
        signatures: signatures.clone(),
    }
}
