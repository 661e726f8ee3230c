//! Calendar arithmetic for monthly projections
//!
//! Month stepping clamps the day-of-month downward when the target month is
//! shorter, so "the 30th" posts on Feb 28/29 instead of failing.

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Full month names, indexed by month number minus one.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Identity of one calendar month, the bucket postings are grouped under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    /// Month number, 1-12
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Full month name, e.g. "January"
    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Abbreviated form used in output file names, e.g. "Jan2024"
    pub fn abbrev(&self) -> String {
        format!("{}{}", &self.name()[..3], self.year)
    }

    /// First day of the month as a date
    pub fn first_day(&self) -> NaiveDate {
        clamped_date(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}

/// Canonical month-bucket identity of a date
pub fn month_key(date: NaiveDate) -> MonthKey {
    MonthKey::new(date.year(), date.month())
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_of_next =
        NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("month is in 1..=12");
    (first_of_next - Duration::days(1)).day()
}

/// Build a date, clamping the day downward when it does not exist in the
/// month (e.g. day 30 in February). Total for any month in 1..=12.
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is always valid")
}

/// Add `n` months (negative to subtract), clamping the day to the target
/// month's length. Jan 30 + 1 month is Feb 28, or Feb 29 in a leap year.
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let mut year = date.year();
    let mut month = date.month() as i32 + n;
    while month > 12 {
        month -= 12;
        year += 1;
    }
    while month < 1 {
        month += 12;
        year -= 1;
    }
    clamped_date(year, month as u32, date.day())
}

/// Whole calendar months from `a` to `b`, sign-aware: negative when `a`
/// is after `b`. The day-of-month is ignored.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i32 {
    (b.year() - a.year()) * 12 + (b.month() as i32 - a.month() as i32)
}
