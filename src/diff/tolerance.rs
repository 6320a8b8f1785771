// Tolerance bands for cross-environment significance
//
// Distinct from the outlier band: the half-width has a floor proportional to
// the mean, so a run whose few samples happen to agree closely (stddev ~ 0)
// does not make every other environment look significantly different.

use crate::aggregate::Summary;
use serde::Serialize;

/// Interval within which another run's mean is indistinguishable
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ToleranceBand {
    pub low: f64,
    pub high: f64,
}

impl ToleranceBand {
    /// `mean ± max(stddev, floor * |mean|)`
    ///
    /// An undefined standard deviation (single execution) falls back to the
    /// floor alone.
    ///
    /// # Example
    /// ```
    /// use benchdiff::aggregate::Summary;
    /// use benchdiff::diff::ToleranceBand;
    ///
    /// let summary = Summary { count: 3, mean: 120.0, min: 117.0, max: 123.0, stddev: Some(3.0) };
    /// let band = ToleranceBand::for_summary(&summary, 0.05);
    /// assert_eq!((band.low, band.high), (114.0, 126.0));
    /// ```
    pub fn for_summary(summary: &Summary, floor: f64) -> Self {
        let half_width = Self::half_width(summary, floor);
        Self {
            low: summary.mean - half_width,
            high: summary.mean + half_width,
        }
    }

    pub fn half_width(summary: &Summary, floor: f64) -> f64 {
        let relative = floor * summary.mean.abs();
        match summary.stddev {
            Some(stddev) => stddev.max(relative),
            None => relative,
        }
    }

    /// Inclusive containment; values on the edge are not significant
    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}
