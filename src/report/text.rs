// Aligned plain-text rendering
//
// `_group` columns are lifted out of the grid: rows are split into one
// sub-table per distinct group value, titled e.g. "Unit: BYTES". The
// unit of that group drives the formatting of `_unit` columns.

use super::columns::{label_from_name, suffix, Alignment, ColumnKind};
use super::format::{format_number, format_value, trim_long};
use super::{Cell, Table};
use crate::metric::Unit;
use std::collections::BTreeMap;
use std::fmt::Write;

const SEPARATOR: &str = "  ";

/// Render all tables, one titled block each
pub fn render_text(tables: &[Table]) -> String {
    let mut output = String::new();
    for table in tables {
        render_table(table, &mut output);
        output.push('\n');
    }
    output
}

fn render_table(table: &Table, output: &mut String) {
    let _ = writeln!(output, "== {} ==", table.title);
    if !table.description.is_empty() {
        let _ = writeln!(output, "{}", table.description);
    }
    output.push('\n');

    if table.is_empty() {
        output.push_str("(no rows)\n");
        return;
    }

    let group_columns: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| ColumnKind::of(name) == ColumnKind::Group)
        .map(|(i, _)| i)
        .collect();
    let visible: Vec<usize> = (0..table.columns.len())
        .filter(|i| !group_columns.contains(i))
        .collect();

    let mut groups: BTreeMap<Vec<(String, String)>, Vec<&Vec<Cell>>> = BTreeMap::new();
    for row in &table.rows {
        let mut key: Vec<(String, String)> = group_columns
            .iter()
            .map(|&i| {
                let value = row.get(i).map(Cell::raw).unwrap_or_default();
                (table.columns[i].clone(), value)
            })
            .collect();
        key.sort();
        groups.entry(key).or_default().push(row);
    }

    let mut first = true;
    for (key, rows) in groups {
        if !first {
            output.push('\n');
        }
        first = false;

        if !key.is_empty() {
            let title: Vec<String> = key
                .iter()
                .map(|(name, value)| format!("{}: {}", label_from_name(name), value))
                .collect();
            let _ = writeln!(output, "{}", title.join(", "));
        }

        let unit = key
            .iter()
            .find(|(name, _)| name == "unit_group")
            .map(|(_, value)| Unit::from(value.as_str()))
            .unwrap_or(Unit::Unitless);
        render_grid(table, &visible, &rows, &unit, output);
    }
}

fn render_grid(
    table: &Table,
    visible: &[usize],
    rows: &[&Vec<Cell>],
    unit: &Unit,
    output: &mut String,
) {
    let headers: Vec<String> = visible
        .iter()
        .map(|&i| label_from_name(&table.columns[i]))
        .collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            visible
                .iter()
                .map(|&i| match row.get(i) {
                    Some(cell) => render_cell(&table.columns[i], cell, unit),
                    None => String::new(),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for line in &body {
        for (width, value) in widths.iter_mut().zip(line) {
            *width = (*width).max(value.chars().count());
        }
    }
    let alignments: Vec<Alignment> = visible
        .iter()
        .map(|&i| ColumnKind::of(&table.columns[i]).alignment())
        .collect();

    write_line(output, &headers, &widths, &alignments);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    write_line(output, &rule, &widths, &alignments);
    for line in &body {
        write_line(output, line, &widths, &alignments);
    }
}

fn write_line(output: &mut String, values: &[String], widths: &[usize], alignments: &[Alignment]) {
    let cells: Vec<String> = values
        .iter()
        .zip(widths)
        .zip(alignments)
        .map(|((value, &width), alignment)| match alignment {
            Alignment::Left => format!("{:<width$}", value, width = width),
            Alignment::Right => format!("{:>width$}", value, width = width),
        })
        .collect();
    output.push_str(cells.join(SEPARATOR).trim_end());
    output.push('\n');
}

/// Line breaks would tear the grid apart
fn single_line(value: &str) -> String {
    value.lines().collect::<Vec<_>>().join(" ")
}

/// Display form of one cell, formatted by its column suffix
fn render_cell(column: &str, cell: &Cell, unit: &Unit) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Int(v) => v.to_string(),
        Cell::Text(s) => single_line(&trim_long(s)),
        Cell::Float(v) if !v.is_finite() => String::new(),
        Cell::Float(v) => match suffix(column) {
            "unit" => format_value(unit, Some(*v)),
            "err" | "num2f" => format!("{:.2}", v),
            "pct" => format!("{:.2}%", v),
            _ => format_number(*v),
        },
    }
}
