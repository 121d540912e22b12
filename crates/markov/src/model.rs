//! Single-regime, time-homogeneous Markov model.

use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use regime_calendar::Period;

use crate::cdf::{check_uniform, cumulative, cumulative_columns, select_in};
use crate::error::MarkovError;
use crate::risk::adjust_probabilities;
use crate::validate::{check_distribution, check_state, check_transition_matrix};

/// A validated, time-homogeneous Markov chain with per-state holding
/// periods.
///
/// Column `k` of the transition matrix is the distribution of the next state
/// given current state `k`. Each state also carries the calendar
/// [`Period`] an individual stays in it before the next transition is drawn.
///
/// Equality compares the dynamics only (transition matrix and periods),
/// not the initial distribution.
#[derive(Debug, Clone)]
pub struct MarkovModel {
    transitions: Array2<f64>,
    transition_cdfs: Array2<f64>,
    periods: Vec<Period>,
    initial: Array1<f64>,
    initial_cdf: Array1<f64>,
}

impl MarkovModel {
    /// Builds a model from a column-stochastic transition matrix, one period
    /// per state, and an initial-state distribution.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::InvalidModel`] if the matrix is empty or not
    /// square, the period or initial vectors have the wrong length, a period
    /// is negative, a zero period belongs to a non-absorbing state, or any
    /// column or the initial distribution is not a probability distribution.
    pub fn new(
        transitions: Array2<f64>,
        periods: Vec<Period>,
        initial: Array1<f64>,
    ) -> Result<Self, MarkovError> {
        let dim = check_transition_matrix("transition matrix", &transitions, None)?;
        if periods.len() != dim {
            return Err(MarkovError::invalid(format!(
                "got {} periods for {dim} states",
                periods.len()
            )));
        }
        if initial.len() != dim {
            return Err(MarkovError::invalid(format!(
                "got {} initial probabilities for {dim} states",
                initial.len()
            )));
        }
        for (k, period) in periods.iter().enumerate() {
            if period.is_negative() {
                return Err(MarkovError::invalid(format!(
                    "period for state {k} is negative: {period}"
                )));
            }
            if period.is_zero() && transitions[[k, k]] != 1.0 {
                return Err(MarkovError::invalid(format!(
                    "state {k} has a zero period but is not absorbing (P[{k},{k}] = {})",
                    transitions[[k, k]]
                )));
            }
        }
        check_distribution("initial distribution", initial.view())?;

        let transition_cdfs = cumulative_columns(&transitions);
        let initial_cdf = cumulative(initial.view());
        Ok(Self {
            transitions,
            transition_cdfs,
            periods,
            initial,
            initial_cdf,
        })
    }

    /// Number of states.
    pub fn dim(&self) -> usize {
        self.initial.len()
    }

    /// The column-stochastic transition matrix.
    pub fn transitions(&self) -> &Array2<f64> {
        &self.transitions
    }

    /// Holding periods, one per state.
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// The initial-state distribution.
    pub fn initial_distribution(&self) -> &Array1<f64> {
        &self.initial
    }

    /// Samples the next state from column `state` using the draw `u`.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` is out of range or `u` is outside `[0, 1]`.
    pub fn select_next_state(&self, state: usize, u: f64) -> Result<usize, MarkovError> {
        let state = check_state(state, self.dim())?;
        let u = check_uniform(u)?;
        Ok(select_in(self.transition_cdfs.column(state), u))
    }

    /// Samples the next state after reweighting column `state` by
    /// `relative_risks` (see [`adjust_probabilities`]).
    ///
    /// # Errors
    ///
    /// Returns an error if `state` or `u` is out of range, or if the
    /// relative risks are invalid or infeasible.
    pub fn select_next_state_with_risks(
        &self,
        state: usize,
        relative_risks: &[f64],
        u: f64,
    ) -> Result<usize, MarkovError> {
        let state = check_state(state, self.dim())?;
        let u = check_uniform(u)?;
        let adjusted = adjust_probabilities(self.transitions.column(state), relative_risks)?;
        Ok(select_in(cumulative(adjusted.view()).view(), u))
    }

    /// Samples an initial state using the draw `u`.
    ///
    /// # Errors
    ///
    /// Returns an error if `u` is outside `[0, 1]`.
    pub fn select_initial_state(&self, u: f64) -> Result<usize, MarkovError> {
        let u = check_uniform(u)?;
        Ok(select_in(self.initial_cdf.view(), u))
    }

    /// Samples an initial state after reweighting the initial distribution
    /// by `relative_risks`.
    ///
    /// # Errors
    ///
    /// Returns an error if `u` is out of range, or if the relative risks are
    /// invalid or infeasible.
    pub fn select_initial_state_with_risks(
        &self,
        relative_risks: &[f64],
        u: f64,
    ) -> Result<usize, MarkovError> {
        let u = check_uniform(u)?;
        let adjusted = adjust_probabilities(self.initial.view(), relative_risks)?;
        Ok(select_in(cumulative(adjusted.view()).view(), u))
    }

    /// Holding period of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`MarkovError::StateOutOfRange`] for an invalid state.
    pub fn transition_period(&self, state: usize) -> Result<Period, MarkovError> {
        let state = check_state(state, self.dim())?;
        Ok(self.periods[state])
    }

    /// Date of the next transition for an individual entering `state` on
    /// `date`.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid state or if the date overflows.
    pub fn next_transition_date(
        &self,
        state: usize,
        date: NaiveDate,
    ) -> Result<NaiveDate, MarkovError> {
        Ok(self.transition_period(state)?.add_to(date)?)
    }
}

impl PartialEq for MarkovModel {
    fn eq(&self, other: &Self) -> bool {
        self.transitions == other.transitions && self.periods == other.periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn yearly(n: usize) -> Vec<Period> {
        vec![Period::years(1); n]
    }

    fn two_state() -> MarkovModel {
        MarkovModel::new(
            array![[0.25, 0.5], [0.75, 0.5]],
            yearly(2),
            array![0.3, 0.7],
        )
        .unwrap()
    }

    #[test]
    fn construct_ok() {
        let model = two_state();
        assert_eq!(model.dim(), 2);
        assert_eq!(model.periods(), &[Period::years(1), Period::years(1)]);
        assert_eq!(model.initial_distribution(), &array![0.3, 0.7]);
    }

    #[test]
    fn rejects_empty_matrix() {
        let result = MarkovModel::new(Array2::zeros((0, 0)), vec![], Array1::zeros(0));
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn rejects_non_square() {
        let result = MarkovModel::new(
            Array2::from_elem((2, 3), 0.5),
            yearly(2),
            array![0.5, 0.5],
        );
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn rejects_wrong_period_count() {
        let result = MarkovModel::new(
            array![[1.0, 0.0], [0.0, 1.0]],
            yearly(3),
            array![0.5, 0.5],
        );
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn rejects_wrong_initial_length() {
        let result = MarkovModel::new(
            array![[1.0, 0.0], [0.0, 1.0]],
            yearly(2),
            array![1.0],
        );
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn rejects_negative_period() {
        let result = MarkovModel::new(
            array![[1.0, 0.0], [0.0, 1.0]],
            vec![Period::days(1), Period::days(-1)],
            array![0.5, 0.5],
        );
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn zero_period_requires_absorbing_state() {
        // State 1 is absorbing, so a zero period is fine there.
        let ok = MarkovModel::new(
            array![[0.5, 0.0], [0.5, 1.0]],
            vec![Period::years(1), Period::days(0)],
            array![1.0, 0.0],
        );
        assert!(ok.is_ok());
        // State 0 is not absorbing.
        let bad = MarkovModel::new(
            array![[0.5, 0.0], [0.5, 1.0]],
            vec![Period::days(0), Period::years(1)],
            array![1.0, 0.0],
        );
        assert!(matches!(bad, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn rejects_non_stochastic_column() {
        let result = MarkovModel::new(
            array![[0.5, 0.5], [0.6, 0.5]],
            yearly(2),
            array![0.5, 0.5],
        );
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn rejects_bad_initial_distribution() {
        let result = MarkovModel::new(
            array![[1.0, 0.0], [0.0, 1.0]],
            yearly(2),
            array![0.5, 0.6],
        );
        assert!(matches!(result, Err(MarkovError::InvalidModel { .. })));
    }

    #[test]
    fn select_next_state_uses_column() {
        let model = two_state();
        // Column 0: [0.25, 0.75].
        assert_eq!(model.select_next_state(0, 0.25).unwrap(), 0);
        assert_eq!(model.select_next_state(0, 0.2501).unwrap(), 1);
        // Column 1: [0.5, 0.5].
        assert_eq!(model.select_next_state(1, 0.5).unwrap(), 0);
        assert_eq!(model.select_next_state(1, 0.9).unwrap(), 1);
    }

    #[test]
    fn select_next_state_domain_errors() {
        let model = two_state();
        assert!(matches!(
            model.select_next_state(2, 0.5),
            Err(MarkovError::StateOutOfRange { state: 2, dim: 2 })
        ));
        assert!(matches!(
            model.select_next_state(0, 1.5),
            Err(MarkovError::UniformOutOfRange { .. })
        ));
    }

    #[test]
    fn select_next_state_with_risks_reweights() {
        let model = two_state();
        // Column 0 [0.25, 0.75] with risks [2, 1] becomes [0.4, 0.6].
        assert_eq!(model.select_next_state_with_risks(0, &[2.0, 1.0], 0.39).unwrap(), 0);
        assert_eq!(model.select_next_state_with_risks(0, &[2.0, 1.0], 0.41).unwrap(), 1);
        // Unadjusted, 0.39 would land in state 1.
        assert_eq!(model.select_next_state(0, 0.39).unwrap(), 1);
    }

    #[test]
    fn select_next_state_with_risks_errors() {
        let model = two_state();
        assert!(matches!(
            model.select_next_state_with_risks(0, &[1.0], 0.5),
            Err(MarkovError::LengthMismatch { .. })
        ));
        assert!(matches!(
            model.select_next_state_with_risks(0, &[-1.0, 1.0], 0.5),
            Err(MarkovError::InvalidRelativeRisk { .. })
        ));
        assert!(matches!(
            model.select_next_state_with_risks(0, &[0.0, 0.0], 0.5),
            Err(MarkovError::InfeasibleAdjustment)
        ));
    }

    #[test]
    fn select_initial_state() {
        let model = two_state();
        assert_eq!(model.select_initial_state(0.3).unwrap(), 0);
        assert_eq!(model.select_initial_state(0.31).unwrap(), 1);
        // Risks [1, 0] force state 0.
        assert_eq!(model.select_initial_state_with_risks(&[1.0, 0.0], 0.99).unwrap(), 0);
        // NaN leaves state 1 at 0.7; state 0 keeps its own mass.
        assert_eq!(model.select_initial_state_with_risks(&[5.0, f64::NAN], 0.31).unwrap(), 1);
    }

    #[test]
    fn transition_period_and_date() {
        let model = MarkovModel::new(
            array![[0.5, 0.0], [0.5, 1.0]],
            vec![Period::months(6), Period::days(0)],
            array![1.0, 0.0],
        )
        .unwrap();
        assert_eq!(model.transition_period(0).unwrap(), Period::months(6));
        let date = NaiveDate::from_ymd_opt(2020, 8, 31).unwrap();
        assert_eq!(
            model.next_transition_date(0, date).unwrap(),
            NaiveDate::from_ymd_opt(2021, 2, 28).unwrap()
        );
        assert_eq!(model.next_transition_date(1, date).unwrap(), date);
        assert!(model.transition_period(2).is_err());
    }

    #[test]
    fn equality_ignores_initial_distribution() {
        let a = two_state();
        let b = MarkovModel::new(
            array![[0.25, 0.5], [0.75, 0.5]],
            yearly(2),
            array![1.0, 0.0],
        )
        .unwrap();
        assert_eq!(a, b);

        let c = MarkovModel::new(
            array![[0.25, 0.5], [0.75, 0.5]],
            vec![Period::years(1), Period::years(2)],
            array![0.3, 0.7],
        )
        .unwrap();
        assert_ne!(a, c);

        let d = MarkovModel::new(
            array![[0.3, 0.5], [0.7, 0.5]],
            yearly(2),
            array![0.3, 0.7],
        )
        .unwrap();
        assert_ne!(a, d);
    }

    #[test]
    fn trait_assertions() {
        fn assert_send_sync<T: Send + Sync>() {}
        fn assert_clone<T: Clone>() {}
        assert_send_sync::<MarkovModel>();
        assert_clone::<MarkovModel>();
    }
}
