//! Date parsing and the fallback policy for missing or invalid ranges.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, TimeDelta};
use regex::Regex;

/// Date-only wire format used everywhere a date leaves the core.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

/// Parse `YYYY-MM-DD` or `YYYY/MM/DD`.
///
/// Anything else, including calendar-impossible dates like `2025-02-30`,
/// yields `None` so the caller can fall back to a default.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let normalized = raw.trim().replace('/', "-");
    if !iso_date_pattern().is_match(&normalized) {
        return None;
    }
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT).ok()
}

/// Parse an optional raw date, treating absent and invalid the same way.
pub fn parse_opt(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(parse_date)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// Four-digit years only; keeps every manufactured date representable.
fn clamp_year(year: i32) -> i32 {
    year.clamp(1, 9999)
}

/// Default start for an initiative with no explicit start: `<year>-01-15`.
pub fn default_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(clamp_year(year), 1, 15).unwrap_or_default()
}

/// Default end for an initiative with no due date: `<year>-11-01`.
pub fn default_end(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(clamp_year(year), 11, 1).unwrap_or_default()
}

pub fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(clamp_year(year), 1, 1).unwrap_or_default()
}

pub fn year_end(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(clamp_year(year), 12, 31).unwrap_or_default()
}

/// `date` shifted by `days`. An offset outside chrono's range leaves the
/// date unchanged.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    TimeDelta::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(date)
}

/// The year of the caller's local calendar.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// A closed date interval with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// Build a span, forcing `end = start` when the end predates the start.
    ///
    /// The start is never moved.
    pub fn repaired(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// The default initiative window for a reference year.
    pub fn defaults_for(year: i32) -> Self {
        Self::repaired(default_start(year), default_end(year))
    }

    /// Clamp both boundaries into `[window.start, window.end]`.
    pub fn clamp_to(&self, window: DateSpan) -> Self {
        let start = self.start.clamp(window.start, window.end);
        let end = self.end.clamp(window.start, window.end);
        Self::repaired(start, end)
    }
}

/// How a span was resolved, for debug logging of data repairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub start_defaulted: bool,
    pub end_defaulted: bool,
    pub end_forced: bool,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        !self.start_defaulted && !self.end_defaulted && !self.end_forced
    }
}

/// Resolve a raw start/end pair against a fallback span.
///
/// Each boundary falls back independently; an inverted result has its end
/// forced to its start.
pub fn resolve_span(
    raw_start: Option<&str>,
    raw_end: Option<&str>,
    fallback: DateSpan,
) -> (DateSpan, Resolution) {
    let parsed_start = parse_opt(raw_start);
    let parsed_end = parse_opt(raw_end);

    let start = parsed_start.unwrap_or(fallback.start);
    let end = parsed_end.unwrap_or(fallback.end);
    let span = DateSpan::repaired(start, end);

    let resolution = Resolution {
        start_defaulted: parsed_start.is_none(),
        end_defaulted: parsed_end.is_none(),
        end_forced: end < start,
    };
    (span, resolution)
}
