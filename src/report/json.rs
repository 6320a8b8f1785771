// JSON rendering of report tables

use super::Table;
use crate::error::{BenchdiffError, Result};

/// Pretty-printed JSON array of `{title, description, columns, rows}`
pub fn to_json(tables: &[Table]) -> Result<String> {
    serde_json::to_string_pretty(tables).map_err(|e| BenchdiffError::RenderError(e.to_string()))
}
