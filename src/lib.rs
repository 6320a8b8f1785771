//! Benchdiff - cross-environment benchmark comparison
//!
//! Turns a read-only snapshot of benchmark measurements into derived tables:
//! per-run aggregates, outlier validation, property-signature run matching,
//! significance-tested diffs between environments, Top-N rankings and diff
//! histograms.
//!
//! # Example
//! ```
//! use benchdiff::analysis::Analysis;
//! use benchdiff::config::AnalysisConfig;
//! use benchdiff::model::Snapshot;
//! use benchdiff::report::{build_reports, ReportKind};
//!
//! let config = AnalysisConfig::default();
//! let analysis = Analysis::run(&Snapshot::default(), &config);
//! let tables = build_reports(&analysis, &config, &[ReportKind::Diffs]);
//! assert!(tables[0].is_empty());
//! ```

pub mod aggregate;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod histogram;
pub mod matcher;
pub mod metric;
pub mod model;
pub mod outlier;
pub mod rank;
pub mod report;
pub mod signature;
pub mod store;

pub use error::{BenchdiffError, Result};
