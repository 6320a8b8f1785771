//! Metric identifiers, scopes and units
//!
//! Raw metric identifiers encode their scope as an optional `scope-` prefix:
//! `prestoQuery-cpuTime` belongs to the `prestoQuery` scope, while a bare
//! `duration` is measured by the benchmark driver.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scope assigned to identifiers without a `-` separator
pub const DRIVER_SCOPE: &str = "driver";

/// Cluster-wide resource metrics
pub const CLUSTER_SCOPE: &str = "cluster";

/// Per-query engine metrics
pub const PRESTO_QUERY_SCOPE: &str = "prestoQuery";

/// Normalized metric identity: `(short_name, scope)`
///
/// Ordered by name first so report rows for the same metric stay adjacent
/// across scopes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricKey {
    pub name: String,
    pub scope: String,
}

impl MetricKey {
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
        }
    }

    pub fn is_driver(&self) -> bool {
        self.scope == DRIVER_SCOPE
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.scope, self.name)
    }
}

/// Split a raw metric identifier into scope and short name
///
/// Total: every string is accepted, unrecognized scopes are kept verbatim.
///
/// # Example
/// ```
/// use benchdiff::metric::normalize;
///
/// let key = normalize("prestoQuery-totalCpuTime");
/// assert_eq!(key.scope, "prestoQuery");
/// assert_eq!(key.name, "totalCpuTime");
///
/// let key = normalize("duration");
/// assert_eq!(key.scope, "driver");
/// assert_eq!(key.name, "duration");
/// ```
pub fn normalize(identifier: &str) -> MetricKey {
    match identifier.split_once('-') {
        Some((scope, name)) => MetricKey::new(scope, name),
        None => MetricKey::new(DRIVER_SCOPE, identifier),
    }
}

/// Measurement unit
///
/// Known units get dedicated formatting; anything else is carried verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Unit {
    Milliseconds,
    Bytes,
    Percent,
    QueryPerSecond,
    Unitless,
    Other(String),
}

impl Unit {
    pub fn as_str(&self) -> &str {
        match self {
            Unit::Milliseconds => "MILLISECONDS",
            Unit::Bytes => "BYTES",
            Unit::Percent => "PERCENT",
            Unit::QueryPerSecond => "QUERY_PER_SECOND",
            Unit::Unitless => "NONE",
            Unit::Other(raw) => raw,
        }
    }
}

impl From<String> for Unit {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "MILLISECONDS" => Unit::Milliseconds,
            "BYTES" => Unit::Bytes,
            "PERCENT" => Unit::Percent,
            "QUERY_PER_SECOND" => Unit::QueryPerSecond,
            "NONE" | "" => Unit::Unitless,
            _ => Unit::Other(raw),
        }
    }
}

impl From<&str> for Unit {
    fn from(raw: &str) -> Self {
        Unit::from(raw.to_string())
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.as_str().to_string()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric together with its unit: the grouping dimension for histograms
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MetricDimension {
    pub metric: MetricKey,
    pub unit: Unit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_scoped_identifier() {
        let key = normalize("cluster-memory");
        assert_eq!(key, MetricKey::new(CLUSTER_SCOPE, "memory"));
        assert!(!key.is_driver());
    }

    #[test]
    fn test_normalize_unscoped_identifier() {
        let key = normalize("throughput");
        assert_eq!(key, MetricKey::new(DRIVER_SCOPE, "throughput"));
        assert!(key.is_driver());
    }

    #[test]
    fn test_normalize_splits_on_first_dash_only() {
        let key = normalize("prestoQuery-peak-memory");
        assert_eq!(key.scope, PRESTO_QUERY_SCOPE);
        assert_eq!(key.name, "peak-memory");
    }

    #[test]
    fn test_normalize_degenerate_identifiers() {
        assert_eq!(normalize(""), MetricKey::new("driver", ""));
        assert_eq!(normalize("-cpu"), MetricKey::new("", "cpu"));
        assert_eq!(normalize("cpu-"), MetricKey::new("cpu", ""));
    }

    #[test]
    fn test_unit_round_trip_known_and_unknown() {
        assert_eq!(Unit::from("BYTES"), Unit::Bytes);
        assert_eq!(Unit::from("QUERY_PER_SECOND"), Unit::QueryPerSecond);
        assert_eq!(Unit::from(""), Unit::Unitless);
        assert_eq!(Unit::from("WIDGETS"), Unit::Other("WIDGETS".to_string()));
        assert_eq!(Unit::from("WIDGETS").to_string(), "WIDGETS");
    }

    #[test]
    fn test_unit_serde_as_plain_string() {
        let json = serde_json::to_string(&Unit::Milliseconds).unwrap();
        assert_eq!(json, "\"MILLISECONDS\"");
        let unit: Unit = serde_json::from_str("\"NANOS\"").unwrap();
        assert_eq!(unit, Unit::Other("NANOS".to_string()));
    }

    #[test]
    fn test_metric_key_orders_by_name_then_scope() {
        let mut keys = vec![
            MetricKey::new("driver", "duration"),
            MetricKey::new("cluster", "duration"),
            MetricKey::new("cluster", "cpu"),
        ];
        keys.sort();
        assert_eq!(keys[0].name, "cpu");
        assert_eq!(keys[1].scope, "cluster");
        assert_eq!(keys[2].scope, "driver");
    }
}
