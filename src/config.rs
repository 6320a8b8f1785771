// Configuration for benchmark comparison
//
// The two statistical checks are deliberately separate knobs: the outlier
// band (data-quality validation) and the diff tolerance band (cross-environment
// significance) serve different reports and are tuned independently.

use crate::error::{BenchdiffError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outlier validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlierConfig {
    /// Band half-width in standard deviations around a run's mean
    ///
    /// Default: 2.0
    pub sigma: f64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self { sigma: 2.0 }
    }
}

/// Diff significance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffConfig {
    /// Minimum tolerance half-width as a fraction of the mean
    ///
    /// The tolerance band of a run is `mean ± max(stddev, floor * |mean|)`.
    /// Keeps near-zero standard deviations from few samples from turning
    /// noise into significant differences.
    ///
    /// Default: 0.05 (5% of the mean)
    pub tolerance_floor: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            tolerance_floor: 0.05,
        }
    }
}

/// Top-N ranking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    /// Rows kept per metric
    pub top_n: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self { top_n: 5 }
    }
}

/// Histogram settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HistogramConfig {
    /// Equal-width interior buckets; one overflow bucket is added for the maximum
    pub buckets: usize,
    /// Characters of the longest bar
    pub bar_width: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            buckets: 9,
            bar_width: 20,
        }
    }
}

/// Which run properties feed the report's name columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PropertyConfig {
    /// Property holding the benchmark name
    pub benchmark: String,
    /// Property holding the query name
    pub query: String,
    /// Environment attributes never displayed
    pub hidden_attributes: Vec<String>,
}

impl Default for PropertyConfig {
    fn default() -> Self {
        Self {
            benchmark: "benchmark".to_string(),
            query: "query".to_string(),
            hidden_attributes: vec!["startup_logs".to_string()],
        }
    }
}

/// Complete analysis configuration
///
/// # Example
/// ```
/// use benchdiff::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.outliers.sigma, 2.0);
/// assert_eq!(config.diff.tolerance_floor, 0.05);
/// assert_eq!(config.rank.top_n, 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub outliers: OutlierConfig,
    pub diff: DiffConfig,
    pub rank: RankConfig,
    pub histogram: HistogramConfig,
    pub properties: PropertyConfig,
}

impl AnalysisConfig {
    /// Fewer flagged outliers and significant diffs
    pub fn strict() -> Self {
        Self {
            outliers: OutlierConfig { sigma: 3.0 },
            diff: DiffConfig {
                tolerance_floor: 0.10,
            },
            ..Self::default()
        }
    }

    /// More flagged outliers and significant diffs
    pub fn permissive() -> Self {
        Self {
            outliers: OutlierConfig { sigma: 1.5 },
            diff: DiffConfig {
                tolerance_floor: 0.01,
            },
            rank: RankConfig { top_n: 10 },
            ..Self::default()
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        tracing::debug!("Loaded configuration from {}", path.as_ref().display());
        Self::from_toml_str(&content)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(self.outliers.sigma.is_finite() && self.outliers.sigma > 0.0) {
            return Err(BenchdiffError::InvalidConfig(format!(
                "outliers.sigma must be positive, got {}",
                self.outliers.sigma
            )));
        }

        if !(self.diff.tolerance_floor.is_finite() && self.diff.tolerance_floor >= 0.0) {
            return Err(BenchdiffError::InvalidConfig(format!(
                "diff.tolerance_floor must be non-negative, got {}",
                self.diff.tolerance_floor
            )));
        }

        if self.rank.top_n == 0 {
            return Err(BenchdiffError::InvalidConfig(
                "rank.top_n must be >= 1".to_string(),
            ));
        }

        if self.histogram.buckets == 0 {
            return Err(BenchdiffError::InvalidConfig(
                "histogram.buckets must be >= 1".to_string(),
            ));
        }

        Ok(())
    }
}
