//! # regime-calendar
//!
//! Calendar step periods for mapping real dates onto discrete model time.
//!
//! ## Architecture
//!
//! ```mermaid
//! graph LR
//!     A["&quot;3M&quot;"] -->|"str::parse()"| B["Period"]
//!     B -->|".add_to(date)"| C["NaiveDate"]
//!     B -->|".whole_periods_between(start, end)"| D["u64 step index"]
//!     B -->|"period_sequence()"| E["Vec of NaiveDate"]
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use regime_calendar::{Period, period_sequence};
//!
//! let start = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
//! let quarter: Period = "3M".parse().unwrap();
//!
//! let next = quarter.add_to(start).unwrap();
//! assert_eq!(next, NaiveDate::from_ymd_opt(2020, 4, 30).unwrap());
//!
//! let end = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
//! assert_eq!(quarter.whole_periods_between(start, end).unwrap(), 3);
//!
//! let dates = period_sequence(start, quarter, 4).unwrap();
//! assert_eq!(dates.len(), 4);
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `period` | Period units, parsing, and date arithmetic |
//! | `sequence` | Date sequence generation |
//! | `error` | Error types |

mod error;
mod period;
mod sequence;

pub use error::CalendarError;
pub use period::{Period, PeriodUnit};
pub use sequence::period_sequence;
