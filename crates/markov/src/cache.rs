//! Precomputed marginal state distributions.

use ndarray::{Array1, Array2, ArrayView1};

use crate::cdf::cumulative;

/// Marginal distributions and their CDFs for time indices `0..len`.
///
/// Column `t` of each matrix belongs to time `t`. A cache is built in one
/// go and never partially filled.
#[derive(Debug, Clone)]
pub(crate) struct DistributionCache {
    distributions: Array2<f64>,
    cdfs: Array2<f64>,
}

impl DistributionCache {
    /// Fills `size` columns starting from `initial`, advancing one step at a
    /// time with `step(t, distribution_at_t)`.
    pub(crate) fn build<F>(initial: &Array1<f64>, size: usize, mut step: F) -> Self
    where
        F: FnMut(u64, &Array1<f64>) -> Array1<f64>,
    {
        debug_assert!(size > 0, "an empty cache is represented by None");
        let dim = initial.len();
        let mut distributions = Array2::zeros((dim, size));
        let mut cdfs = Array2::zeros((dim, size));
        let mut current = initial.clone();
        for t in 0..size {
            if t > 0 {
                current = step(t as u64 - 1, &current);
            }
            distributions.column_mut(t).assign(&current);
            cdfs.column_mut(t).assign(&cumulative(current.view()));
        }
        Self {
            distributions,
            cdfs,
        }
    }

    /// Number of cached time indices.
    pub(crate) fn len(&self) -> usize {
        self.distributions.ncols()
    }

    /// Cached distribution at time `t`, if `t` is in range.
    pub(crate) fn distribution(&self, t: u64) -> Option<ArrayView1<'_, f64>> {
        self.index(t).map(|i| self.distributions.column(i))
    }

    /// Cached CDF at time `t`, if `t` is in range.
    pub(crate) fn cdf(&self, t: u64) -> Option<ArrayView1<'_, f64>> {
        self.index(t).map(|i| self.cdfs.column(i))
    }

    /// The latest cached time index and its distribution.
    pub(crate) fn last(&self) -> (u64, ArrayView1<'_, f64>) {
        let i = self.len() - 1;
        (i as u64, self.distributions.column(i))
    }

    fn index(&self, t: u64) -> Option<usize> {
        usize::try_from(t).ok().filter(|&i| i < self.len())
    }
}
