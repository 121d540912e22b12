//! Relative-risk reweighting of base probabilities.

use ndarray::{Array1, ArrayView1};

use crate::error::MarkovError;

/// Reweights a base distribution by per-state relative risks.
///
/// Each entry `i` with a non-NaN risk `r[i]` becomes `base[i] * r[i]`;
/// entries with a NaN risk keep their base probability. The adjusted
/// entries are then rescaled so that together they carry the same mass as
/// they did before adjustment, which keeps the total at 1.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use regime_markov::adjust_probabilities;
///
/// let adjusted = adjust_probabilities(array![0.25, 0.75].view(), &[2.0, 1.0]).unwrap();
/// assert!((adjusted[0] - 0.4).abs() < 1e-12);
/// assert!((adjusted[1] - 0.6).abs() < 1e-12);
/// ```
///
/// # Errors
///
/// - [`MarkovError::LengthMismatch`] if `relative_risks` and `base` differ
///   in length.
/// - [`MarkovError::InvalidRelativeRisk`] if a risk is negative or infinite.
/// - [`MarkovError::InfeasibleAdjustment`] if the adjusted states had
///   positive base mass but every one of them was multiplied down to zero.
pub fn adjust_probabilities(
    base: ArrayView1<'_, f64>,
    relative_risks: &[f64],
) -> Result<Array1<f64>, MarkovError> {
    if relative_risks.len() != base.len() {
        return Err(MarkovError::LengthMismatch {
            what: "relative risks",
            expected: base.len(),
            got: relative_risks.len(),
        });
    }
    if let Some((state, &value)) = relative_risks
        .iter()
        .enumerate()
        .find(|(_, r)| **r < 0.0 || r.is_infinite())
    {
        return Err(MarkovError::InvalidRelativeRisk { state, value });
    }

    let mut adjusted = base.to_owned();
    let mut base_mass = 0.0;
    let mut scaled_mass = 0.0;
    for (p, &r) in adjusted.iter_mut().zip(relative_risks) {
        if r.is_nan() {
            continue;
        }
        base_mass += *p;
        *p *= r;
        scaled_mass += *p;
    }

    if base_mass > 0.0 {
        if scaled_mass == 0.0 {
            return Err(MarkovError::InfeasibleAdjustment);
        }
        let factor = base_mass / scaled_mass;
        for (p, &r) in adjusted.iter_mut().zip(relative_risks) {
            if !r.is_nan() {
                *p *= factor;
            }
        }
    }
    Ok(adjusted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn rescales_to_unit_mass() {
        let adjusted = adjust_probabilities(array![0.25, 0.75].view(), &[2.0, 1.0]).unwrap();
        assert_abs_diff_eq!(adjusted[0], 0.4, epsilon = 1e-15);
        assert_abs_diff_eq!(adjusted[1], 0.6, epsilon = 1e-15);
        assert_abs_diff_eq!(adjusted.sum(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn unit_risks_are_identity() {
        let base = array![0.1, 0.2, 0.7];
        let adjusted = adjust_probabilities(base.view(), &[1.0, 1.0, 1.0]).unwrap();
        for i in 0..3 {
            assert_abs_diff_eq!(adjusted[i], base[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn nan_entries_keep_base_probability() {
        // Only states 0 and 1 are adjusted; their joint mass (0.5) is conserved.
        let adjusted =
            adjust_probabilities(array![0.2, 0.3, 0.5].view(), &[3.0, 1.0, f64::NAN]).unwrap();
        assert_abs_diff_eq!(adjusted[2], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(adjusted[0] + adjusted[1], 0.5, epsilon = 1e-15);
        // 0.6 : 0.3 split of 0.5.
        assert_abs_diff_eq!(adjusted[0], 0.5 * 0.6 / 0.9, epsilon = 1e-15);
        assert_abs_diff_eq!(adjusted.sum(), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn all_nan_is_identity() {
        let base = array![0.4, 0.6];
        let adjusted = adjust_probabilities(base.view(), &[f64::NAN, f64::NAN]).unwrap();
        assert_eq!(adjusted, base);
    }

    #[test]
    fn zero_risk_removes_state() {
        let adjusted = adjust_probabilities(array![0.5, 0.25, 0.25].view(), &[0.0, 1.0, 1.0]).unwrap();
        assert_eq!(adjusted[0], 0.0);
        assert_abs_diff_eq!(adjusted[1], 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(adjusted[2], 0.5, epsilon = 1e-15);
    }

    #[test]
    fn zero_base_mass_is_left_alone() {
        // The adjusted state has no base mass, so there is nothing to rescale.
        let adjusted = adjust_probabilities(array![0.0, 1.0].view(), &[5.0, f64::NAN]).unwrap();
        assert_eq!(adjusted, array![0.0, 1.0]);
    }

    #[test]
    fn infeasible_adjustment() {
        let result = adjust_probabilities(array![0.5, 0.5].view(), &[0.0, 0.0]);
        assert!(matches!(result, Err(MarkovError::InfeasibleAdjustment)));
    }

    #[test]
    fn negative_risk_rejected() {
        let result = adjust_probabilities(array![0.5, 0.5].view(), &[1.0, -0.1]);
        assert!(matches!(
            result,
            Err(MarkovError::InvalidRelativeRisk { state: 1, .. })
        ));
    }

    #[test]
    fn infinite_risk_rejected() {
        let result = adjust_probabilities(array![0.5, 0.5].view(), &[f64::INFINITY, 1.0]);
        assert!(matches!(
            result,
            Err(MarkovError::InvalidRelativeRisk { state: 0, .. })
        ));
    }

    #[test]
    fn length_mismatch() {
        let result = adjust_probabilities(array![0.5, 0.5].view(), &[1.0]);
        assert!(matches!(
            result,
            Err(MarkovError::LengthMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
    }
}
