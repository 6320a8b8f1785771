// Integration test utilities
//
// Builds snapshots through the public model types only.

#![allow(dead_code)]

use benchdiff::metric::Unit;
use benchdiff::model::{
    BenchmarkRun, Environment, MeasurementRow, PropertyKind, RunProperty, RunStatus, Snapshot,
};
use std::collections::BTreeMap;

pub struct SnapshotBuilder {
    snapshot: Snapshot,
    next_execution: u64,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            next_execution: 1,
        }
    }

    pub fn environment(mut self, id: u64, name: &str) -> Self {
        self.snapshot.environments.push(Environment {
            id,
            name: name.to_string(),
            attributes: BTreeMap::new(),
        });
        self
    }

    pub fn run(mut self, id: u64, environment_id: u64, status: RunStatus) -> Self {
        self.snapshot.runs.push(BenchmarkRun {
            id,
            environment_id,
            status,
            sequence_id: "0".to_string(),
        });
        self
    }

    pub fn property(mut self, run_id: u64, kind: PropertyKind, name: &str, value: &str) -> Self {
        self.snapshot.properties.push(RunProperty {
            run_id,
            kind,
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// One execution per value
    pub fn samples(mut self, run_id: u64, metric: &str, unit: &str, values: &[f64]) -> Self {
        for &value in values {
            self.snapshot.measurements.push(MeasurementRow {
                run_id,
                execution_id: self.next_execution,
                metric: metric.to_string(),
                unit: Unit::from(unit),
                value,
            });
            self.next_execution += 1;
        }
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}

/// An ENDED run with the given properties and `duration` samples
pub fn ended_run(
    builder: SnapshotBuilder,
    run_id: u64,
    environment_id: u64,
    properties: &[(PropertyKind, &str, &str)],
    durations: &[f64],
) -> SnapshotBuilder {
    let mut builder = builder.run(run_id, environment_id, RunStatus::Ended);
    for &(kind, name, value) in properties {
        builder = builder.property(run_id, kind, name, value);
    }
    builder.samples(run_id, "duration", "MILLISECONDS", durations)
}
