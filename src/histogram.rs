//! Frequency histograms of diff percentages
//!
//! One histogram per `(metric, scope, unit)` dimension. `[min, max)` is split
//! into equal-width interior buckets `1..=buckets`; values equal to `max`
//! land in the overflow bucket `buckets + 1`. Every bucket is emitted, empty
//! ones with a zero count, so the chart has no gaps. A degenerate range
//! (`min == max`) puts every value in bucket 1.

use crate::diff::RunDiff;
use crate::metric::MetricDimension;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

const BAR_CHAR: &str = "█";

/// One bucket of a histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    /// 1-based bucket index
    pub bucket: usize,
    pub low: f64,
    pub high: f64,
    pub occurrences: usize,
    /// `occurrences / max(occurrences)` over the histogram, in `[0, 1]`
    pub bar_length: f64,
}

impl HistogramBucket {
    /// Human-readable percentage range of the bucket
    pub fn range_label(&self) -> String {
        if self.low == self.high {
            format!("{:.2}%", self.low)
        } else {
            format!("{:.2}% .. {:.2}%", self.low, self.high)
        }
    }

    /// Bar of `round(bar_length * width)` block characters
    pub fn bar(&self, width: usize) -> String {
        let cells = (self.bar_length * width as f64).round() as usize;
        BAR_CHAR.repeat(cells)
    }
}

/// Histogram of all diff percentages of one dimension
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub dimension: MetricDimension,
    pub min: f64,
    pub max: f64,
    pub buckets: Vec<HistogramBucket>,
}

impl Histogram {
    /// Total observations; equals the number of input values
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.occurrences).sum()
    }

    /// Build a histogram over `values` with `interior` equal-width buckets
    ///
    /// Returns `None` when there are no values to bin.
    pub fn from_values(dimension: MetricDimension, values: &[f64], interior: usize) -> Option<Self> {
        let interior = interior.max(1);
        let min = values.iter().copied().reduce(f64::min)?;
        let max = values.iter().copied().reduce(f64::max)?;
        let width = (max - min) / interior as f64;

        let mut counts = vec![0usize; interior + 1];
        for &value in values {
            counts[bucket_index(value, min, max, interior) - 1] += 1;
        }
        let max_count = counts.iter().copied().max().unwrap_or(0).max(1);

        let buckets = counts
            .into_iter()
            .enumerate()
            .map(|(i, occurrences)| {
                let bucket = i + 1;
                let (low, high) = if bucket > interior {
                    (max, max)
                } else {
                    (min + i as f64 * width, min + bucket as f64 * width)
                };
                HistogramBucket {
                    bucket,
                    low,
                    high,
                    occurrences,
                    bar_length: occurrences as f64 / max_count as f64,
                }
            })
            .collect();

        Some(Self {
            dimension,
            min,
            max,
            buckets,
        })
    }
}

/// 1-based bucket of `value` within `[min, max]`
///
/// # Example
/// ```
/// use benchdiff::histogram::bucket_index;
///
/// assert_eq!(bucket_index(0.0, 0.0, 90.0, 9), 1);
/// assert_eq!(bucket_index(45.0, 0.0, 90.0, 9), 5);
/// assert_eq!(bucket_index(90.0, 0.0, 90.0, 9), 10);
/// assert_eq!(bucket_index(7.0, 7.0, 7.0, 9), 1);
/// ```
pub fn bucket_index(value: f64, min: f64, max: f64, interior: usize) -> usize {
    let interior = interior.max(1);
    // Zero width: everything collapses into one bucket
    if max <= min {
        return 1;
    }
    if value >= max {
        return interior + 1;
    }
    if value <= min {
        return 1;
    }
    let width = (max - min) / interior as f64;
    let index = ((value - min) / width).floor() as usize + 1;
    index.clamp(1, interior)
}

/// Histograms of every dimension that has at least one defined diff percentage
///
/// Dimensions are built in parallel and returned in dimension order.
pub fn build_histograms(diffs: &[RunDiff], interior: usize) -> Vec<Histogram> {
    let mut by_dimension: BTreeMap<MetricDimension, Vec<f64>> = BTreeMap::new();
    for diff in diffs {
        if let Some(pct) = diff.diff_pct() {
            by_dimension
                .entry(MetricDimension {
                    metric: diff.metric.clone(),
                    unit: diff.unit.clone(),
                })
                .or_default()
                .push(pct);
        }
    }

    let dimensions: Vec<(MetricDimension, Vec<f64>)> = by_dimension.into_iter().collect();
    let histograms: Vec<Histogram> = dimensions
        .into_par_iter()
        .filter_map(|(dimension, values)| Histogram::from_values(dimension, &values, interior))
        .collect();

    tracing::debug!("Built {} histograms", histograms.len());
    histograms
}
