//! Timestamp recognition for report columns.
//!
//! Reports print times in the server's locale and zone, with or without a
//! 12-hour clock. The zone name is skipped and the wall-clock value is read as
//! UTC, since the report carries no reliable offset.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Layouts with a leading weekday, tried in order.
const WEEKDAY_LAYOUTS: &[&str] = &[
    // Mon Jan 2 15:04:05 2006
    "%a %b %e %H:%M:%S %Y",
    // Mon Jan 02 03:04:05 PM 2006 CEST
    "%a %b %d %I:%M:%S %p %Y %Z",
    "%a %b %e %I:%M:%S %p %Y %Z",
    // Mon Jan 2 15:04:05 2006 CEST
    "%a %b %e %H:%M:%S %Y %Z",
];

/// Layouts tried after dropping a weekday token in an unknown language.
const BARE_LAYOUTS: &[&str] = &["%b %e %H:%M:%S %Y %Z", "%b %e %H:%M:%S %Y"];

/// Parses whitespace separated tokens as one timestamp.
///
/// Returns `None` if no layout matches; the weekday must agree with the date.
#[must_use]
pub fn parse_timestamp(tokens: &[&str]) -> Option<DateTime<Utc>> {
    let candidate = tokens.join(" ");
    if let Some(t) = first_match(&candidate, WEEKDAY_LAYOUTS) {
        return Some(t);
    }

    let (weekday, rest) = tokens.split_first()?;
    if rest.len() < 4 || !weekday.chars().all(char::is_alphabetic) {
        return None;
    }
    first_match(&rest.join(" "), BARE_LAYOUTS)
}

fn first_match(candidate: &str, layouts: &[&str]) -> Option<DateTime<Utc>> {
    layouts
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(candidate, layout).ok())
        .map(|t| t.and_utc())
}

/// Number of trailing tokens a lock timestamp may span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampWindow {
    /// Weekday, month, day, time, year.
    Five,
    /// As [`TimestampWindow::Five`] plus a zone name.
    Six,
}

impl TimestampWindow {
    /// Windows in the order they are tried.
    pub const ORDER: [Self; 2] = [Self::Five, Self::Six];

    /// Token count of the window.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Six => 6,
        }
    }
}

/// Finds a timestamp spanning the last tokens of a row.
///
/// Returns the timestamp and the index of its first token.
#[must_use]
pub fn find_trailing_timestamp(tokens: &[&str]) -> Option<(DateTime<Utc>, usize)> {
    TimestampWindow::ORDER.iter().find_map(|window| {
        let start = tokens.len().checked_sub(window.len())?;
        parse_timestamp(&tokens[start..]).map(|t| (t, start))
    })
}
