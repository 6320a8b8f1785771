// CSV rendering: raw column names, raw values, RFC 4180 quoting

use super::format::slugify;
use super::Table;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Quote a field containing a separator, quote or line break
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render one table as CSV
pub fn to_csv(table: &Table) -> String {
    let mut output = String::new();

    let header: Vec<String> = table.columns.iter().map(|c| escape_field(c)).collect();
    output.push_str(&header.join(","));
    output.push('\n');

    for row in &table.rows {
        let fields: Vec<String> = row.iter().map(|cell| escape_field(&cell.raw())).collect();
        output.push_str(&fields.join(","));
        output.push('\n');
    }

    output
}

/// Write each table to `<dir>/<slug-of-title>.csv`, creating `dir` if needed
pub fn write_csv_dir(tables: &[Table], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!("{}.csv", slugify(&table.title)));
        std::fs::write(&path, to_csv(table))?;
        tracing::debug!("Wrote {} rows to {}", table.len(), path.display());
        written.push(path);
    }
    Ok(written)
}
