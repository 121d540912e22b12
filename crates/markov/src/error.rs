//! Error types for the regime-markov crate.

use regime_calendar::CalendarError;

/// Error type for all fallible operations in the regime-markov crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MarkovError {
    /// Returned when a model fails validation at construction time.
    #[error("invalid model: {reason}")]
    InvalidModel {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a uniform draw lies outside `[0, 1]` or is NaN.
    #[error("uniform draw out of range: {u} (must be in [0, 1])")]
    UniformOutOfRange {
        /// The offending draw.
        u: f64,
    },

    /// Returned when a state index is not below the model dimension.
    #[error("state {state} out of range (dimension {dim})")]
    StateOutOfRange {
        /// The offending state.
        state: usize,
        /// Number of states in the model.
        dim: usize,
    },

    /// Returned when an argument vector has the wrong length.
    #[error("length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        /// Which argument was mismatched.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when a relative risk multiplier is negative or infinite.
    #[error("invalid relative risk for state {state}: {value} (must be finite and >= 0, or NaN)")]
    InvalidRelativeRisk {
        /// Destination state carrying the multiplier.
        state: usize,
        /// The invalid multiplier.
        value: f64,
    },

    /// Returned when a time index has no successor.
    #[error("time index {t} has no successor")]
    TimeOutOfRange {
        /// The offending time index.
        t: u64,
    },

    /// Returned when relative risks remove all probability mass that the
    /// base distribution assigned to the adjusted states.
    #[error("relative risks leave no probability mass to redistribute")]
    InfeasibleAdjustment,

    /// Returned when calendar arithmetic fails.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

impl MarkovError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidModel {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_model() {
        let e = MarkovError::invalid("matrix is empty");
        assert_eq!(e.to_string(), "invalid model: matrix is empty");
    }

    #[test]
    fn error_uniform_out_of_range() {
        let e = MarkovError::UniformOutOfRange { u: 1.5 };
        assert_eq!(
            e.to_string(),
            "uniform draw out of range: 1.5 (must be in [0, 1])"
        );
    }

    #[test]
    fn error_state_out_of_range() {
        let e = MarkovError::StateOutOfRange { state: 3, dim: 3 };
        assert_eq!(e.to_string(), "state 3 out of range (dimension 3)");
    }

    #[test]
    fn error_length_mismatch() {
        let e = MarkovError::LengthMismatch {
            what: "relative risks",
            expected: 4,
            got: 2,
        };
        assert_eq!(
            e.to_string(),
            "length mismatch for relative risks: expected 4, got 2"
        );
    }

    #[test]
    fn error_invalid_relative_risk() {
        let e = MarkovError::InvalidRelativeRisk {
            state: 1,
            value: -0.5,
        };
        assert_eq!(
            e.to_string(),
            "invalid relative risk for state 1: -0.5 (must be finite and >= 0, or NaN)"
        );
    }

    #[test]
    fn error_time_out_of_range() {
        let e = MarkovError::TimeOutOfRange { t: u64::MAX };
        assert_eq!(
            e.to_string(),
            format!("time index {} has no successor", u64::MAX)
        );
    }

    #[test]
    fn error_infeasible_adjustment() {
        let e = MarkovError::InfeasibleAdjustment;
        assert_eq!(
            e.to_string(),
            "relative risks leave no probability mass to redistribute"
        );
    }

    #[test]
    fn error_from_calendar() {
        let e: MarkovError = CalendarError::InvalidPeriod {
            input: "x".to_string(),
        }
        .into();
        assert!(matches!(e, MarkovError::Calendar(_)));
        assert!(e.to_string().starts_with("invalid period"));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<MarkovError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<MarkovError>();
    }
}
