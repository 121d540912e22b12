//! Percentile-to-percentile ("ordinal") mapping between two distributions.
//!
//! Both distributions are treated as discretisations of the same
//! continuous latent variable. Origin state `k` covers the percentile
//! interval `[p0, p1)` of the origin CDF; its column in the derived matrix
//! spreads mass over the destination states in proportion to how much of
//! `[p0, p1)` each destination bracket overlaps. Rank order is preserved:
//! low origin states only ever map onto low destination states.

use ndarray::{Array1, Array2, ArrayView1};

use crate::cdf::{bracket, cumulative};
use crate::error::MarkovError;
use crate::validate::check_distribution;

/// Derives the column-stochastic matrix that maps `from` onto `to` by
/// preserving percentiles.
///
/// The result has `to.len()` rows and `from.len()` columns. Applying it to
/// `from` yields `to`.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use regime_markov::ordinal_mapping;
///
/// let m = ordinal_mapping(array![0.5, 0.5].view(), array![0.2, 0.8].view()).unwrap();
/// assert!((m[[0, 0]] - 0.4).abs() < 1e-12);
/// assert!((m[[1, 0]] - 0.6).abs() < 1e-12);
/// assert_eq!(m[[1, 1]], 1.0);
/// ```
///
/// # Errors
///
/// Returns [`MarkovError::InvalidModel`] if either argument is not a
/// probability distribution.
pub fn ordinal_mapping(
    from: ArrayView1<'_, f64>,
    to: ArrayView1<'_, f64>,
) -> Result<Array2<f64>, MarkovError> {
    check_distribution("origin distribution", from)?;
    check_distribution("destination distribution", to)?;
    Ok(map_percentiles(&cumulative(from), &cumulative(to)))
}

/// Builds the ordinal mapping from two CDFs whose last entries are 1.
pub(crate) fn map_percentiles(from_cdf: &Array1<f64>, to_cdf: &Array1<f64>) -> Array2<f64> {
    let mut mapping = Array2::zeros((to_cdf.len(), from_cdf.len()));
    for (k, mut column) in mapping.columns_mut().into_iter().enumerate() {
        let (p0, p1) = bracket(from_cdf.view(), k);
        let mut total = 0.0;
        if p1 > p0 {
            for (l, cell) in column.iter_mut().enumerate() {
                let (q0, q1) = bracket(to_cdf.view(), l);
                let overlap = (p1.min(q1) - p0.max(q0)).max(0.0);
                *cell = overlap;
                total += overlap;
            }
        }
        if total > 0.0 {
            // total == p1 - p0 up to rounding.
            column.mapv_inplace(|v| v / total);
        } else {
            column.fill(0.0);
            column[containing_bracket(to_cdf.view(), p0)] = 1.0;
        }
    }
    mapping
}

/// Index of the destination bracket `[q0, q1)` containing percentile `p`.
fn containing_bracket(cdf: ArrayView1<'_, f64>, p: f64) -> usize {
    cdf.iter()
        .position(|&q| q > p)
        .unwrap_or(cdf.len().saturating_sub(1))
}
