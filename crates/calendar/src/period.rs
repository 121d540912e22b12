//! Calendar periods: a signed count of days, weeks, months or years.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::error::CalendarError;

/// Unit of a [`Period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodUnit {
    /// Calendar days.
    Days,
    /// Seven-day weeks.
    Weeks,
    /// Calendar months, clamped to the last day of shorter months.
    Months,
    /// Calendar years (twelve months).
    Years,
}

impl PeriodUnit {
    fn suffix(self) -> char {
        match self {
            Self::Days => 'D',
            Self::Weeks => 'W',
            Self::Months => 'M',
            Self::Years => 'Y',
        }
    }
}

/// A signed calendar period such as "7 days" or "3 months".
///
/// Written in compact notation as `<size><unit>`, e.g. `"7D"`, `"2W"`,
/// `"3M"` or `"-1Y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize)]
#[serde(try_from = "String")]
pub struct Period {
    size: i32,
    unit: PeriodUnit,
}

impl Period {
    /// Creates a period of `size` units.
    pub fn new(size: i32, unit: PeriodUnit) -> Self {
        Self { size, unit }
    }

    /// A period of `n` days.
    pub fn days(n: i32) -> Self {
        Self::new(n, PeriodUnit::Days)
    }

    /// A period of `n` weeks.
    pub fn weeks(n: i32) -> Self {
        Self::new(n, PeriodUnit::Weeks)
    }

    /// A period of `n` months.
    pub fn months(n: i32) -> Self {
        Self::new(n, PeriodUnit::Months)
    }

    /// A period of `n` years.
    pub fn years(n: i32) -> Self {
        Self::new(n, PeriodUnit::Years)
    }

    /// Returns the signed number of units.
    pub fn size(self) -> i32 {
        self.size
    }

    /// Returns the unit.
    pub fn unit(self) -> PeriodUnit {
        self.unit
    }

    /// Returns `true` if the period has zero length.
    pub fn is_zero(self) -> bool {
        self.size == 0
    }

    /// Returns `true` if the period points backwards in time.
    pub fn is_negative(self) -> bool {
        self.size < 0
    }

    /// Returns this period repeated `n` times.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] (relative to `anchor`) if the
    /// scaled size overflows.
    pub(crate) fn scaled(self, n: usize, anchor: NaiveDate) -> Result<Self, CalendarError> {
        i32::try_from(n)
            .ok()
            .and_then(|n| self.size.checked_mul(n))
            .map(|size| Self::new(size, self.unit))
            .ok_or_else(|| CalendarError::OutOfRange {
                date: anchor,
                period: self.to_string(),
            })
    }

    /// Shifts `date` by this period.
    ///
    /// Month and year arithmetic clamps to the last valid day of the target
    /// month, so January 31 plus one month is February 28 (or 29).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::OutOfRange`] if the result is not
    /// representable.
    pub fn add_to(self, date: NaiveDate) -> Result<NaiveDate, CalendarError> {
        let backwards = self.size < 0;
        let magnitude = self.size.unsigned_abs();
        let shifted = match self.unit {
            PeriodUnit::Days => shift_days(date, u64::from(magnitude), backwards),
            PeriodUnit::Weeks => shift_days(date, u64::from(magnitude) * 7, backwards),
            PeriodUnit::Months => shift_months(date, magnitude, backwards),
            PeriodUnit::Years => magnitude
                .checked_mul(12)
                .and_then(|m| shift_months(date, m, backwards)),
        };
        shifted.ok_or_else(|| CalendarError::OutOfRange {
            date,
            period: self.to_string(),
        })
    }

    /// Counts the whole periods that fit between `start` and `end`.
    ///
    /// Equivalent to `floor((end - start) / period)`. For month and year
    /// periods a month is only counted once its day of month has been
    /// reached.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::NonPositivePeriod`] if the period is zero or
    /// negative, and [`CalendarError::EndBeforeStart`] if `end < start`.
    pub fn whole_periods_between(
        self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, CalendarError> {
        if self.size <= 0 {
            return Err(CalendarError::NonPositivePeriod {
                period: self.to_string(),
            });
        }
        if end < start {
            return Err(CalendarError::EndBeforeStart { start, end });
        }
        let size = u64::from(self.size.unsigned_abs());
        let n = match self.unit {
            PeriodUnit::Days => elapsed_days(start, end) / size,
            PeriodUnit::Weeks => elapsed_days(start, end) / (7 * size),
            PeriodUnit::Months => elapsed_months(start, end) / size,
            PeriodUnit::Years => elapsed_months(start, end) / (12 * size),
        };
        Ok(n)
    }
}

fn shift_days(date: NaiveDate, days: u64, backwards: bool) -> Option<NaiveDate> {
    if backwards {
        date.checked_sub_days(Days::new(days))
    } else {
        date.checked_add_days(Days::new(days))
    }
}

fn shift_months(date: NaiveDate, months: u32, backwards: bool) -> Option<NaiveDate> {
    if backwards {
        date.checked_sub_months(Months::new(months))
    } else {
        date.checked_add_months(Months::new(months))
    }
}

/// Days from `start` to `end`; callers guarantee `end >= start`.
fn elapsed_days(start: NaiveDate, end: NaiveDate) -> u64 {
    u64::try_from(end.signed_duration_since(start).num_days()).unwrap_or(0)
}

/// Whole calendar months from `start` to `end`; callers guarantee `end >= start`.
fn elapsed_months(start: NaiveDate, end: NaiveDate) -> u64 {
    let raw = (end.year() - start.year()) * 12 + end.month0() as i32 - start.month0() as i32;
    let mut months = u32::try_from(raw).unwrap_or(0);
    if months > 0
        && start
            .checked_add_months(Months::new(months))
            .is_none_or(|d| d > end)
    {
        months -= 1;
    }
    u64::from(months)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.size, self.unit.suffix())
    }
}

impl FromStr for Period {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidPeriod {
            input: s.to_string(),
        };
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let unit = match chars.next_back().map(|c| c.to_ascii_uppercase()) {
            Some('D') => PeriodUnit::Days,
            Some('W') => PeriodUnit::Weeks,
            Some('M') => PeriodUnit::Months,
            Some('Y') => PeriodUnit::Years,
            _ => return Err(invalid()),
        };
        let size: i32 = chars.as_str().parse().map_err(|_| invalid())?;
        Ok(Self::new(size, unit))
    }
}

impl TryFrom<String> for Period {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
