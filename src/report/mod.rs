// Report tables derived from an analysis
//
// Each report is a `Table`: a title, a description, named columns and rows
// of typed cells. Column names carry their role as a suffix (see `columns`),
// which the renderers use for alignment, value formatting and sub-table
// grouping. Three renderers exist: aligned text, JSON and CSV.

mod columns;
mod csv;
mod format;
mod json;
mod tables;
mod text;

pub use columns::{label_from_name, Alignment, ColumnKind};
pub use csv::{to_csv, write_csv_dir};
pub use format::{format_diff_pct, format_number, format_range, format_value, slugify, trim_long};
pub use json::to_json;
pub use tables::{
    DiffRow, EnvironmentDetailRow, HealthRow, HistogramRow, RunDetailRow, TopRow, ValidationRow,
};
pub use text::render_text;

use crate::analysis::Analysis;
use crate::config::AnalysisConfig;
use crate::error::BenchdiffError;
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single table value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Raw textual form: no unit formatting, `Null` as empty
    pub fn raw(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Int(v) => v.to_string(),
            Cell::Float(v) if v.is_finite() => v.to_string(),
            Cell::Float(_) => String::new(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Int(v) => serializer.serialize_i64(*v),
            Cell::Float(v) if v.is_finite() => serializer.serialize_f64(*v),
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Null | Cell::Float(_) => serializer.serialize_none(),
        }
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Cell::Null, Cell::Float)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// A typed row of one report
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    /// Cells in `COLUMNS` order
    fn cells(&self) -> Vec<Cell>;
}

/// A titled result set
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Table {
    pub title: String,
    pub description: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn from_rows<R, I>(title: &str, description: &str, rows: I) -> Self
    where
        R: TableRow,
        I: IntoIterator<Item = R>,
    {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(|row| row.cells()).collect(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(index)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Reports that can be requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKind {
    Validation,
    Health,
    Diffs,
    Top,
    Histogram,
    Runs,
    Environments,
}

impl ReportKind {
    pub const ALL: [ReportKind; 7] = [
        ReportKind::Validation,
        ReportKind::Health,
        ReportKind::Diffs,
        ReportKind::Top,
        ReportKind::Histogram,
        ReportKind::Runs,
        ReportKind::Environments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportKind::Validation => "validation",
            ReportKind::Health => "health",
            ReportKind::Diffs => "diffs",
            ReportKind::Top => "top",
            ReportKind::Histogram => "histogram",
            ReportKind::Runs => "runs",
            ReportKind::Environments => "environments",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = BenchdiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == name)
            .ok_or_else(|| BenchdiffError::UnknownReport(s.to_string()))
    }
}

/// Build the requested reports in request order; an empty request builds all
pub fn build_reports(
    analysis: &Analysis,
    config: &AnalysisConfig,
    kinds: &[ReportKind],
) -> Vec<Table> {
    let kinds: &[ReportKind] = if kinds.is_empty() {
        &ReportKind::ALL
    } else {
        kinds
    };

    kinds
        .iter()
        .map(|kind| {
            let table = match kind {
                ReportKind::Validation => tables::validation_table(analysis),
                ReportKind::Health => tables::health_table(analysis),
                ReportKind::Diffs => tables::diff_table(analysis),
                ReportKind::Top => tables::top_table(analysis, config),
                ReportKind::Histogram => tables::histogram_table(analysis, config),
                ReportKind::Runs => tables::run_detail_table(analysis),
                ReportKind::Environments => tables::environment_detail_table(analysis, config),
            };
            tracing::debug!("Report {}: {} rows", kind, table.len());
            table
        })
        .collect()
}

#[cfg(test)]
mod tests;
