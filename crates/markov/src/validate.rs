//! Validation of probability vectors and column-stochastic matrices.

use ndarray::{Array2, ArrayView1};

use crate::error::MarkovError;

/// Maximum allowed deviation of a distribution's sum from 1.
pub const PROBABILITY_TOLERANCE: f64 = 1e-14;

/// Checks that `probs` is a probability distribution.
///
/// All entries must be finite and in `[0, 1]`, and the sum must be within
/// [`PROBABILITY_TOLERANCE`] of 1.
pub(crate) fn check_distribution(
    what: &str,
    probs: ArrayView1<'_, f64>,
) -> Result<(), MarkovError> {
    if probs.is_empty() {
        return Err(MarkovError::invalid(format!("{what} is empty")));
    }
    for (i, &p) in probs.iter().enumerate() {
        if !p.is_finite() {
            return Err(MarkovError::invalid(format!(
                "{what}[{i}] is not finite: {p}"
            )));
        }
        if !(0.0..=1.0).contains(&p) {
            return Err(MarkovError::invalid(format!(
                "{what}[{i}] = {p} is outside [0, 1]"
            )));
        }
    }
    let sum = probs.sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(MarkovError::invalid(format!(
            "{what} sums to {sum}, expected 1"
        )));
    }
    Ok(())
}

/// Checks that `matrix` is a non-empty, square, column-stochastic matrix
/// and returns its dimension.
///
/// If `dim` is given, the matrix must also be `dim x dim`.
pub(crate) fn check_transition_matrix(
    what: &str,
    matrix: &Array2<f64>,
    dim: Option<usize>,
) -> Result<usize, MarkovError> {
    let (rows, cols) = matrix.dim();
    if rows == 0 || cols == 0 {
        return Err(MarkovError::invalid(format!("{what} is empty")));
    }
    if rows != cols {
        return Err(MarkovError::invalid(format!(
            "{what} is not square: {rows}x{cols}"
        )));
    }
    if let Some(dim) = dim.filter(|&d| d != rows) {
        return Err(MarkovError::invalid(format!(
            "{what} is {rows}x{cols}, expected {dim}x{dim}"
        )));
    }
    for (k, column) in matrix.columns().into_iter().enumerate() {
        check_distribution(&format!("{what} column {k}"), column)?;
    }
    Ok(rows)
}

/// Checks that `state` indexes one of `dim` states.
pub(crate) fn check_state(state: usize, dim: usize) -> Result<usize, MarkovError> {
    if state < dim {
        Ok(state)
    } else {
        Err(MarkovError::StateOutOfRange { state, dim })
    }
}
