//! Date sequence generation.

use chrono::NaiveDate;

use crate::error::CalendarError;
use crate::period::Period;

/// Generates `n` dates spaced one `period` apart, starting at `start`.
///
/// Each date is computed from `start` directly (`start + i * period`), so
/// month-end clamping never accumulates: a monthly sequence from January 31
/// visits February 28, March 31, April 30, ...
///
/// # Errors
///
/// Returns [`CalendarError::OutOfRange`] if any date in the sequence is not
/// representable.
pub fn period_sequence(
    start: NaiveDate,
    period: Period,
    n: usize,
) -> Result<Vec<NaiveDate>, CalendarError> {
    (0..n)
        .map(|i| period.scaled(i, start)?.add_to(start))
        .collect()
}
