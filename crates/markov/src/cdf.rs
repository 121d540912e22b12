//! Discrete CDF sampling.
//!
//! Every draw in this crate goes through [`select_index`]: a uniform value
//! `u` selects the smallest index `i` with `u <= cdf[i]`. CDFs are
//! right-continuous, so a draw landing exactly on a breakpoint selects the
//! state that ends there.

use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::error::MarkovError;

/// Selects the smallest index `i` such that `u <= cdf[i]`.
///
/// Returns `cdf.len() - 1` if no entry reaches `u`, which only happens
/// when rounding leaves the last entry fractionally below a draw of 1.0.
/// Runs in `O(log n)`.
///
/// # Example
///
/// ```
/// use regime_markov::select_index;
///
/// let cdf = [0.3, 0.7, 1.0];
/// assert_eq!(select_index(&cdf, 0.3), 0);
/// assert_eq!(select_index(&cdf, 0.30001), 1);
/// assert_eq!(select_index(&cdf, 1.0), 2);
/// ```
pub fn select_index(cdf: &[f64], u: f64) -> usize {
    select_in(ArrayView1::from(cdf), u)
}

/// [`select_index`] over a (possibly strided) ndarray view, such as a
/// column of a transition CDF matrix.
pub(crate) fn select_in(cdf: ArrayView1<'_, f64>, u: f64) -> usize {
    let n = cdf.len();
    debug_assert!(n > 0, "CDF must not be empty");
    let (mut lo, mut hi) = (0, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cdf[mid] < u {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo.min(n.saturating_sub(1))
}

/// Prefix-sums a probability vector into a CDF.
///
/// The last entry is forced to exactly 1.0 to absorb rounding error.
pub fn cumulative(probs: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut cdf = probs.to_owned();
    cdf.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
    if let Some(last) = cdf.last_mut() {
        *last = 1.0;
    }
    cdf
}

/// Column-wise [`cumulative`] for a column-stochastic matrix.
pub fn cumulative_columns(matrix: &Array2<f64>) -> Array2<f64> {
    let mut cdfs = matrix.to_owned();
    cdfs.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
    if let Some(mut last) = cdfs.rows_mut().into_iter().last() {
        last.fill(1.0);
    }
    cdfs
}

/// Percentile interval `[lower, upper)` covered by index `i` of a CDF.
pub(crate) fn bracket(cdf: ArrayView1<'_, f64>, i: usize) -> (f64, f64) {
    let lower = if i == 0 { 0.0 } else { cdf[i - 1] };
    (lower, cdf[i])
}

/// Checks that a uniform draw lies in `[0, 1]`.
pub(crate) fn check_uniform(u: f64) -> Result<f64, MarkovError> {
    if (0.0..=1.0).contains(&u) {
        Ok(u)
    } else {
        Err(MarkovError::UniformOutOfRange { u })
    }
}
