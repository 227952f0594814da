//! Project dates
//!
//! Calendar-correct month arithmetic and the project's temporal envelope.
//! All document dates are ISO `YYYY-MM-DD` strings; this module is the only
//! place that turns them into [`NaiveDate`] values.

use chrono::{Months, NaiveDate};
use std::fmt::{self, Display, Formatter};

/// Date format used throughout the document
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a document date
///
/// Accepts a bare `YYYY-MM-DD` or a longer timestamp whose first ten
/// characters are one. Returns `None` for empty or unparseable input.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let candidate = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(candidate, DATE_FORMAT).ok()
}

/// Format a date the way the document stores it
#[inline]
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Add calendar months, clamping the day to the target month's length
///
/// `2026-01-31 + 1 month` is `2026-02-28`, never `2026-03-03`.
#[inline]
#[must_use]
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Last day of a project that starts on `start` and runs `duration_months`
///
/// The project ends the day before the same calendar position `duration_months`
/// later. Returns `None` for a zero duration.
#[must_use]
pub fn project_end_date(start: NaiveDate, duration_months: u32) -> Option<NaiveDate> {
    if duration_months == 0 {
        return None;
    }
    add_months(start, duration_months)?.pred_opt()
}

/// The `[projectStart, projectEnd]` interval all schedule data must respect
///
/// `end` is absent when the project duration is not known yet; only the lower
/// bound applies then.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectEnvelope {
    start: NaiveDate,
    end: Option<NaiveDate>,
}

impl ProjectEnvelope {
    /// Create envelope from explicit bounds
    ///
    /// An `end` earlier than `start` is collapsed onto `start`.
    #[must_use]
    pub fn new(start: NaiveDate, end: Option<NaiveDate>) -> Self {
        Self {
            start,
            end: end.map(|e| e.max(start)),
        }
    }

    /// Derive envelope from a start date string and a duration in months
    #[must_use]
    pub fn from_parts(start: &str, duration_months: Option<u32>) -> Option<Self> {
        let start = parse_date(start)?;
        let end = duration_months.and_then(|m| project_end_date(start, m));
        Some(Self::new(start, end))
    }

    /// First project day
    #[inline]
    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last project day, if known
    #[inline]
    #[must_use]
    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    /// Clamp a date into the envelope
    #[inline]
    #[must_use]
    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        let lower = date.max(self.start);
        match self.end {
            Some(end) => lower.min(end),
            None => lower,
        }
    }

    /// Check if a date lies inside the envelope
    #[inline]
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.map_or(true, |end| date <= end)
    }
}

impl Display for ProjectEnvelope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {}]", format_date(self.start), format_date(end)),
            None => write!(f, "[{}, ?]", format_date(self.start)),
        }
    }
}
