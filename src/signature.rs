//! Canonical property signatures of benchmark runs
//!
//! Two runs describe the same benchmark configuration iff the union of their
//! attributes and variables is the same set of `(name, value)` pairs. The
//! signature is that set in sorted order, so neither insertion order nor the
//! attribute/variable split affects matching.
//!
//! Ordering is by `(name, value)` tuple, not by the concatenated `name=value`
//! string.

use crate::model::{Dataset, RunId, RunProperties};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Sorted, deduplicated `(name, value)` pairs of a run's configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PropertySignature {
    pairs: Vec<(String, String)>,
}

impl PropertySignature {
    /// Build a signature from any number of property sources
    ///
    /// # Example
    /// ```
    /// use benchdiff::signature::PropertySignature;
    ///
    /// let a = PropertySignature::from_pairs([("scale", "10"), ("bench", "tpch")]);
    /// let b = PropertySignature::from_pairs([("bench", "tpch"), ("scale", "10"), ("bench", "tpch")]);
    /// assert_eq!(a, b);
    /// assert_eq!(a.entries(), vec!["bench=tpch", "scale=10"]);
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let set: BTreeSet<(String, String)> = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        Self {
            pairs: set.into_iter().collect(),
        }
    }

    /// Signature of a run's attributes and variables
    pub fn from_properties(properties: &RunProperties) -> Self {
        Self::from_pairs(
            properties
                .attributes
                .iter()
                .chain(properties.variables.iter())
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Value of a property, the smallest one if the name occurs twice
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// `name=value` strings in canonical order
    pub fn entries(&self) -> Vec<String> {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect()
    }

    /// Human readable form, `name=value` joined by `, `
    pub fn label(&self) -> String {
        self.entries().join(", ")
    }

    /// Stable SHA-256 digest of the signature (hex)
    ///
    /// Names and values are length-prefixed so that separators inside
    /// values cannot produce collisions.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in &self.pairs {
            hasher.update((name.len() as u64).to_le_bytes());
            hasher.update(name.as_bytes());
            hasher.update((value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// First 12 hex characters of the digest
    pub fn short_id(&self) -> String {
        let mut digest = self.digest();
        digest.truncate(12);
        digest
    }
}

impl fmt::Display for PropertySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.label())
    }
}

/// Signatures of all ended runs
pub fn build_signatures(dataset: &Dataset) -> BTreeMap<RunId, PropertySignature> {
    let empty = RunProperties::default();
    dataset
        .ended_runs()
        .map(|run| {
            let properties = dataset.run_properties(run.id).unwrap_or(&empty);
            (run.id, PropertySignature::from_properties(properties))
        })
        .collect()
}
