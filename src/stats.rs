//! Per-gene statistics used by the gene filters
//!
//! Column statistics run in parallel across genes; each column is reduced
//! independently so the result does not depend on scheduling.

use ndarray::{ArrayView2, Axis};
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Arithmetic mean of every column. Empty columns yield NaN.
pub fn column_means(values: ArrayView2<'_, f64>) -> Vec<f64> {
    let columns: Vec<_> = values.axis_iter(Axis(1)).collect();
    columns
        .into_par_iter()
        .map(|col| {
            if col.is_empty() {
                f64::NAN
            } else {
                col.iter().mean()
            }
        })
        .collect()
}

/// Sample variance (n - 1 denominator) of every column.
///
/// A column with fewer than two values has no spread to measure and reports 0.0.
pub fn column_variances(values: ArrayView2<'_, f64>) -> Vec<f64> {
    let columns: Vec<_> = values.axis_iter(Axis(1)).collect();
    columns
        .into_par_iter()
        .map(|col| {
            if col.len() < 2 {
                0.0
            } else {
                col.iter().variance()
            }
        })
        .collect()
}

/// Lower nearest-rank percentile: the k-th smallest value with k = floor(n * p / 100).
///
/// Returns None when k is 0, meaning no value lies at or below the percentile.
pub fn rank_percentile(values: &[f64], percentile: f64) -> Option<f64> {
    let n = values.len();
    let k = ((n as f64) * percentile / 100.0).floor() as usize;
    if k == 0 {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(sorted[k.min(n) - 1])
}
