// Cross-environment diffs between matched runs
//
// For every environment pair (ordered by name, so each pair appears once) and
// every pair of runs sharing a property signature, each shared metric yields:
// - diff     = right.mean - left.mean
// - diff_pct = 100 * diff / max(left.mean, right.mean), undefined on a zero
//   denominator
// - significance: either mean falls outside the other run's tolerance band
//   `mean ± max(stddev, floor * |mean|)`
//
// diff_pct is exactly antisymmetric: swapping sides negates the numerator
// while max() keeps the denominator.

mod engine;
mod tolerance;

pub use engine::{DiffEngine, DiffStats, RunDiff};
pub use tolerance::ToleranceBand;
