//! Relative date-period resolution for search filters.
//!
//! Date-range filters accept free-form period phrases ("last week",
//! "past month", "today") alongside absolute bounds. A period resolves to an
//! absolute lower bound against the clock supplied by the caller, which keeps
//! resolution testable.

use chrono::{DateTime, Months, NaiveTime, Utc};
use std::fmt;

/// A recognized relative date period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePeriod {
    /// Since midnight today.
    Today,
    /// Since midnight yesterday.
    Yesterday,
    /// The trailing seven days.
    PastWeek,
    /// The trailing calendar month.
    PastMonth,
    /// The trailing calendar year.
    PastYear,
}

impl DatePeriod {
    /// Parse a period out of a free-form phrase.
    ///
    /// Matching is substring-based and case-insensitive, so "saved last week"
    /// and "past week" both resolve to [`DatePeriod::PastWeek`]. More specific
    /// phrases are checked first ("yesterday" before the bare day words).
    pub fn parse(phrase: &str) -> Option<Self> {
        let p = phrase.to_lowercase();
        if p.contains("today") {
            Some(DatePeriod::Today)
        } else if p.contains("yesterday") {
            Some(DatePeriod::Yesterday)
        } else if p.contains("last week") || p.contains("past week") {
            Some(DatePeriod::PastWeek)
        } else if p.contains("last month") || p.contains("past month") {
            Some(DatePeriod::PastMonth)
        } else if p.contains("last year") || p.contains("past year") {
            Some(DatePeriod::PastYear)
        } else {
            None
        }
    }

    /// Resolve this period to an absolute lower bound relative to `now`.
    ///
    /// Day periods snap to midnight; trailing periods are offsets from `now`
    /// itself, matching how users read "last week" in a search box.
    pub fn lower_bound(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            DatePeriod::Today => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            DatePeriod::Yesterday => (now - chrono::Duration::days(1))
                .date_naive()
                .and_time(NaiveTime::MIN)
                .and_utc(),
            DatePeriod::PastWeek => now - chrono::Duration::days(7),
            DatePeriod::PastMonth => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            DatePeriod::PastYear => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        }
    }
}

impl fmt::Display for DatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DatePeriod::Today => "today",
            DatePeriod::Yesterday => "yesterday",
            DatePeriod::PastWeek => "past week",
            DatePeriod::PastMonth => "past month",
            DatePeriod::PastYear => "past year",
        };
        write!(f, "{}", s)
    }
}

/// Resolve a free-form period phrase directly to a lower bound, if recognized.
pub fn resolve_period(phrase: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    DatePeriod::parse(phrase).map(|p| p.lower_bound(now))
}
