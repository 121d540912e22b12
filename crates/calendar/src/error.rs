//! Error types for the regime-calendar crate.

/// Error type for all fallible operations in the regime-calendar crate.
///
/// This enum covers period parsing failures and date arithmetic that
/// leaves the range representable by [`chrono::NaiveDate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CalendarError {
    /// Returned when a period string cannot be parsed.
    #[error("invalid period: {input:?} (expected e.g. \"7D\", \"2W\", \"3M\", \"1Y\")")]
    InvalidPeriod {
        /// The string that failed to parse.
        input: String,
    },

    /// Returned when a period used for counting steps is zero or negative.
    #[error("period must be positive, got {period}")]
    NonPositivePeriod {
        /// The offending period in compact notation.
        period: String,
    },

    /// Returned when an interval ends before it starts.
    #[error("end date {end} precedes start date {start}")]
    EndBeforeStart {
        /// Interval start.
        start: chrono::NaiveDate,
        /// Interval end.
        end: chrono::NaiveDate,
    },

    /// Returned when date arithmetic overflows the supported date range.
    #[error("date arithmetic out of range: {date} + {period}")]
    OutOfRange {
        /// The date the period was applied to.
        date: chrono::NaiveDate,
        /// The period in compact notation.
        period: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn error_invalid_period() {
        let err = CalendarError::InvalidPeriod {
            input: "3Q".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid period: \"3Q\" (expected e.g. \"7D\", \"2W\", \"3M\", \"1Y\")"
        );
    }

    #[test]
    fn error_non_positive_period() {
        let err = CalendarError::NonPositivePeriod {
            period: "0D".to_string(),
        };
        assert_eq!(err.to_string(), "period must be positive, got 0D");
    }

    #[test]
    fn error_end_before_start() {
        let err = CalendarError::EndBeforeStart {
            start: NaiveDate::from_ymd_opt(2020, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "end date 2020-01-01 precedes start date 2020-02-01"
        );
    }

    #[test]
    fn error_out_of_range() {
        let err = CalendarError::OutOfRange {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            period: "1Y".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "date arithmetic out of range: 2020-01-01 + 1Y"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<CalendarError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<CalendarError>();
    }

    #[test]
    fn error_is_partial_eq() {
        let a = CalendarError::InvalidPeriod {
            input: "x".to_string(),
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
