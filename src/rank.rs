//! Top-N ranking of significant diffs
//!
//! Significant diffs with a defined percentage are ordered by `diff_pct`
//! descending. Ties resolve on `(left_env, right_env, left_run, right_run,
//! benchmark, query, metric)` so the order never depends on input order.

use crate::diff::RunDiff;
use crate::metric::MetricKey;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A diff with its 1-based position within its metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedDiff<'a> {
    pub rank: usize,
    pub diff: &'a RunDiff,
}

/// Deterministic ranking order: largest `diff_pct` first
pub fn rank_order(a: &RunDiff, b: &RunDiff) -> Ordering {
    let a_pct = a.diff_pct().unwrap_or(f64::NEG_INFINITY);
    let b_pct = b.diff_pct().unwrap_or(f64::NEG_INFINITY);
    b_pct
        .total_cmp(&a_pct)
        .then_with(|| a.left_environment.cmp(&b.left_environment))
        .then_with(|| a.right_environment.cmp(&b.right_environment))
        .then(a.left_run_id.cmp(&b.left_run_id))
        .then(a.right_run_id.cmp(&b.right_run_id))
        .then_with(|| a.benchmark_name.cmp(&b.benchmark_name))
        .then_with(|| a.query_name.cmp(&b.query_name))
        .then_with(|| a.metric.cmp(&b.metric))
}

/// Keep at most `n` ranked diffs per metric
///
/// Output is grouped by metric (in metric order), ranked within each group.
pub fn top_n(diffs: &[RunDiff], n: usize) -> Vec<RankedDiff<'_>> {
    let mut by_metric: BTreeMap<&MetricKey, Vec<&RunDiff>> = BTreeMap::new();
    for diff in diffs {
        if diff.is_significant() && diff.diff_pct().is_some() {
            by_metric.entry(&diff.metric).or_default().push(diff);
        }
    }

    let mut ranked = Vec::new();
    for (_, mut candidates) in by_metric {
        candidates.sort_by(|a, b| rank_order(a, b));
        ranked.extend(
            candidates
                .into_iter()
                .take(n)
                .enumerate()
                .map(|(i, diff)| RankedDiff { rank: i + 1, diff }),
        );
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Summary;
    use crate::diff::DiffStats;
    use crate::metric::Unit;

    fn diff(metric: &str, left_run: u64, pct: Option<f64>, significant: bool) -> RunDiff {
        let summary = Summary {
            count: 2,
            mean: 1.0,
            min: 1.0,
            max: 1.0,
            stddev: None,
        };
        RunDiff {
            left_environment_id: 1,
            left_environment: "a".to_string(),
            right_environment_id: 2,
            right_environment: "b".to_string(),
            left_run_id: left_run,
            right_run_id: left_run + 100,
            benchmark_name: "tpch".to_string(),
            query_name: "q01".to_string(),
            properties: String::new(),
            signature_id: String::new(),
            metric: MetricKey::new("driver", metric),
            unit: Unit::Milliseconds,
            left: summary,
            right: summary,
            stats: DiffStats {
                diff: 0.0,
                diff_pct: pct,
                significant,
            },
        }
    }

    #[test]
    fn test_top_n_sorts_descending() {
        let diffs = vec![
            diff("duration", 1, Some(5.0), true),
            diff("duration", 2, Some(50.0), true),
            diff("duration", 3, Some(-20.0), true),
        ];
        let ranked = top_n(&diffs, 5);
        let pcts: Vec<_> = ranked.iter().map(|r| r.diff.diff_pct().unwrap()).collect();
        assert_eq!(pcts, vec![50.0, 5.0, -20.0]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_top_n_truncates_per_metric() {
        let mut diffs = Vec::new();
        for run in 0..8 {
            diffs.push(diff("duration", run, Some(run as f64), true));
            diffs.push(diff("cpu", run, Some(run as f64), true));
        }
        let ranked = top_n(&diffs, 5);
        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked.iter().filter(|r| r.diff.metric.name == "cpu").count(), 5);
        assert_eq!(ranked[0].diff.metric.name, "cpu");
        assert_eq!(ranked[5].diff.metric.name, "duration");
    }

    #[test]
    fn test_top_n_skips_insignificant_and_undefined() {
        let diffs = vec![
            diff("duration", 1, Some(90.0), false),
            diff("duration", 2, None, true),
            diff("duration", 3, Some(1.0), true),
        ];
        let ranked = top_n(&diffs, 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].diff.left_run_id, 3);
    }

    #[test]
    fn test_ties_break_on_run_ids() {
        let diffs = vec![
            diff("duration", 9, Some(10.0), true),
            diff("duration", 4, Some(10.0), true),
            diff("duration", 7, Some(10.0), true),
        ];
        let ranked = top_n(&diffs, 5);
        let runs: Vec<_> = ranked.iter().map(|r| r.diff.left_run_id).collect();
        assert_eq!(runs, vec![4, 7, 9]);

        let mut reversed = diffs.clone();
        reversed.reverse();
        let again: Vec<_> = top_n(&reversed, 5)
            .iter()
            .map(|r| r.diff.left_run_id)
            .collect();
        assert_eq!(runs, again);
    }
}
