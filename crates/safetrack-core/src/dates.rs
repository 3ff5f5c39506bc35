//! Calendar arithmetic for expiry dates.
//!
//! Expiry is tracked at day granularity. A document stays valid through its
//! expiry date and is expired from the following day.

use chrono::{Datelike, Months, NaiveDate};

use crate::CoreError;

/// Signed count of complete calendar months from `from` to `to`.
///
/// Truncates toward zero: Jan 15 → Apr 14 is 2, Jan 15 → Apr 15 is 3, and
/// Apr 14 → Jan 15 is -2. Month addition clamps to the end of shorter months,
/// so Jan 31 → Feb 28 counts as one month.
pub fn whole_months(from: NaiveDate, to: NaiveDate) -> i32 {
    if to < from {
        return -whole_months(to, from);
    }

    // Upper bound from the calendar fields; walk down until `from + n <= to`.
    let mut n = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    while n > 0
        && from
            .checked_add_months(Months::new(n as u32))
            .is_none_or(|d| d > to)
    {
        n -= 1;
    }
    n
}

/// Days from `today` until `date`; negative once `date` has passed.
pub fn days_until(today: NaiveDate, date: NaiveDate) -> i64 {
    (date - today).num_days()
}

/// Parse an ISO 8601 calendar date.
///
/// Accepts `YYYY-MM-DD` as well as full timestamps (`2025-03-01T00:00:00Z`),
/// in which case only the date part is kept.
pub fn parse_date(s: &str) -> Result<NaiveDate, CoreError> {
    let day = s.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|source| CoreError::InvalidDate {
        value: s.to_string(),
        source,
    })
}
