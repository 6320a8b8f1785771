// Report table tests over a small two-environment analysis

use super::*;
use crate::model::fixtures::SnapshotBuilder;
use crate::model::{RunStatus, Snapshot};
use std::collections::BTreeSet;

fn snapshot() -> Snapshot {
    let mut snapshot = SnapshotBuilder::new()
        .environment(1, "A")
        .environment(2, "B")
        .run(10, 1, RunStatus::Ended)
        .attribute(10, "benchmark", "tpch")
        .attribute(10, "query", "q01")
        .variable(10, "scale", "10")
        .samples(10, "duration", "MILLISECONDS", &[98.0, 100.0, 102.0])
        .samples(
            10,
            "cluster-cpu",
            "PERCENT",
            &[10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 10.0, 100.0],
        )
        .run(20, 2, RunStatus::Ended)
        .attribute(20, "query", "q01")
        .attribute(20, "benchmark", "tpch")
        .variable(20, "scale", "10")
        .samples(20, "duration", "MILLISECONDS", &[117.0, 120.0, 123.0])
        .run(21, 2, RunStatus::Failed)
        .attribute(21, "benchmark", "tpch")
        .samples(21, "duration", "MILLISECONDS", &[1.0, 2.0])
        .run(22, 2, RunStatus::Ended)
        .attribute(22, "benchmark", "tpcds")
        .samples(22, "duration", "MILLISECONDS", &[7.0])
        .build();
    snapshot.environments[0]
        .attributes
        .insert("nodes".to_string(), "4".to_string());
    snapshot.environments[0]
        .attributes
        .insert("startup_logs".to_string(), "...".to_string());
    snapshot
}

fn reports(kinds: &[ReportKind]) -> Vec<Table> {
    let config = AnalysisConfig::default();
    let analysis = Analysis::run(&snapshot(), &config);
    build_reports(&analysis, &config, kinds)
}

fn cell<'a>(table: &'a Table, row: usize, column: &str) -> &'a Cell {
    &table.rows[row][table.column_index(column).unwrap()]
}

#[test]
fn test_report_kind_parsing() {
    assert_eq!("diffs".parse::<ReportKind>().unwrap(), ReportKind::Diffs);
    assert_eq!(" TOP ".parse::<ReportKind>().unwrap(), ReportKind::Top);
    let err = "pie".parse::<ReportKind>().unwrap_err();
    assert!(matches!(err, BenchdiffError::UnknownReport(name) if name == "pie"));
    for kind in ReportKind::ALL {
        assert_eq!(kind.to_string().parse::<ReportKind>().unwrap(), kind);
    }
}

#[test]
fn test_empty_request_builds_every_report() {
    let tables = reports(&[]);
    let titles: Vec<_> = tables.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Validation",
            "Environment Health",
            "Diffs",
            "Top 5 Diffs",
            "Diff Histogram",
            "Run Details",
            "Environment Details",
        ]
    );
}

#[test]
fn test_validation_table() {
    let table = &reports(&[ReportKind::Validation])[0];
    assert_eq!(table.columns, ValidationRow::COLUMNS);

    // A/tpch,q01 | B/tpcds | B/tpch | B/tpch,q01
    assert_eq!(table.len(), 4);
    assert_eq!(cell(table, 0, "environment"), &Cell::from("A"));
    assert_eq!(
        cell(table, 0, "attributes_label"),
        &Cell::from("benchmark=tpch, query=q01")
    );
    assert_eq!(cell(table, 0, "executions_num"), &Cell::Int(13));
    assert_eq!(cell(table, 0, "outliers_num"), &Cell::Int(1));
    assert_eq!(cell(table, 0, "driver_outliers_num"), &Cell::Int(0));
    assert_eq!(cell(table, 0, "metrics_with_outliers_label"), &Cell::from("cpu"));
    assert_eq!(cell(table, 0, "outlier_executions_num"), &Cell::Int(1));

    let failed = table
        .rows
        .iter()
        .position(|row| row[table.column_index("statuses_label").unwrap()] == Cell::from("FAILED"))
        .unwrap();
    assert_eq!(cell(table, failed, "invalid_executions_num"), &Cell::Int(2));
    assert_eq!(cell(table, failed, "outliers_num"), &Cell::Int(0));
}

#[test]
fn test_validation_statuses_are_sorted() {
    let snapshot = SnapshotBuilder::new()
        .environment(1, "A")
        .run(10, 1, RunStatus::Ended)
        .attribute(10, "benchmark", "tpch")
        .samples(10, "duration", "MILLISECONDS", &[1.0])
        .run(11, 1, RunStatus::Started)
        .attribute(11, "benchmark", "tpch")
        .run(12, 1, RunStatus::Failed)
        .attribute(12, "benchmark", "tpch")
        .build();
    let config = AnalysisConfig::default();
    let analysis = Analysis::run(&snapshot, &config);
    let table = &build_reports(&analysis, &config, &[ReportKind::Validation])[0];

    assert_eq!(table.len(), 1);
    assert_eq!(cell(table, 0, "statuses_label"), &Cell::from("ENDED, FAILED, STARTED"));
    assert_eq!(cell(table, 0, "runs_num"), &Cell::Int(3));
}

#[test]
fn test_health_table() {
    let table = &reports(&[ReportKind::Health])[0];
    assert_eq!(table.len(), 2);
    // A: shares tpch/q01, misses tpcds
    assert_eq!(table.rows[0][1..], [Cell::Int(1), Cell::Int(0), Cell::Int(1), Cell::Int(1), Cell::Int(0)]);
    // B: shares tpch/q01, has extra tpcds, one failed run
    assert_eq!(table.rows[1][1..], [Cell::Int(3), Cell::Int(1), Cell::Int(1), Cell::Int(0), Cell::Int(1)]);
}

#[test]
fn test_diff_table_scenario_row() {
    let table = &reports(&[ReportKind::Diffs])[0];
    assert_eq!(table.len(), 1);
    assert_eq!(cell(table, 0, "left_environment"), &Cell::from("A"));
    assert_eq!(cell(table, 0, "benchmark_name"), &Cell::from("tpch"));
    assert_eq!(cell(table, 0, "query_name"), &Cell::from("q01"));
    assert_eq!(cell(table, 0, "metric_scope"), &Cell::from("driver"));
    assert_eq!(cell(table, 0, "diff_label"), &Cell::from("20.00ms"));
    assert_eq!(cell(table, 0, "diff_pct_label"), &Cell::from("▲ 16.67%"));
    assert_eq!(cell(table, 0, "left_mean_unit"), &Cell::Float(100.0));
    assert_eq!(cell(table, 0, "left_range_label"), &Cell::from("98.00ms .. 102.00ms"));
    assert_eq!(cell(table, 0, "significant_label"), &Cell::from("yes"));
}

#[test]
fn test_top_table_ranks() {
    let table = &reports(&[ReportKind::Top])[0];
    assert_eq!(table.columns[0], "rank_num");
    assert_eq!(table.len(), 1);
    assert_eq!(cell(table, 0, "rank_num"), &Cell::Int(1));
}

#[test]
fn test_histogram_table_is_complete() {
    let table = &reports(&[ReportKind::Histogram])[0];
    assert_eq!(table.len(), 10);
    let total: i64 = table
        .column("occurrences_num")
        .unwrap()
        .into_iter()
        .filter_map(|c| c.as_f64())
        .map(|v| v as i64)
        .sum();
    assert_eq!(total, 1);
    assert_eq!(cell(table, 0, "bar_chart_label"), &Cell::from("█".repeat(20)));
    assert_eq!(cell(table, 1, "bar_chart_label"), &Cell::from(""));
}

#[test]
fn test_run_detail_table() {
    let table = &reports(&[ReportKind::Runs])[0];
    // run 10: cpu + duration, run 20: duration, run 22: duration
    assert_eq!(table.len(), 4);
    assert_eq!(cell(table, 0, "run_id"), &Cell::Int(10));
    assert_eq!(cell(table, 0, "metric"), &Cell::from("cpu"));
    assert_eq!(cell(table, 0, "outliers_num"), &Cell::Int(1));
    assert_eq!(cell(table, 0, "properties_label"), &Cell::from("benchmark=tpch, query=q01, scale=10"));

    let single = table
        .rows
        .iter()
        .position(|row| row[0] == Cell::Int(22))
        .unwrap();
    assert!(cell(table, single, "stddev_err").is_null());
    assert_eq!(cell(table, single, "executions_num"), &Cell::Int(1));
}

#[test]
fn test_signature_id_joins_diffs_and_run_details() {
    let tables = reports(&[ReportKind::Diffs, ReportKind::Runs]);
    let (diffs, runs) = (&tables[0], &tables[1]);

    let id = cell(diffs, 0, "signature_id").clone();
    let Cell::Text(text) = &id else {
        panic!("signature_id is not text: {:?}", id);
    };
    assert_eq!(text.len(), 12);
    assert!(text.chars().all(|c| c.is_ascii_hexdigit()));

    let run_column = runs.column_index("run_id").unwrap();
    let id_column = runs.column_index("signature_id").unwrap();
    let joined: BTreeSet<i64> = runs
        .rows
        .iter()
        .filter(|row| row[id_column] == id)
        .filter_map(|row| row[run_column].as_f64())
        .map(|v| v as i64)
        .collect();
    assert_eq!(joined, BTreeSet::from([10, 20]));
}

#[test]
fn test_environment_detail_hides_attributes() {
    let table = &reports(&[ReportKind::Environments])[0];
    assert_eq!(table.len(), 1);
    assert_eq!(table.rows[0], vec![Cell::from("A"), Cell::from("nodes"), Cell::from("4")]);
}
