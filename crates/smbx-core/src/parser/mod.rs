//! Parser for the tabular reports printed by `smbstatus`.
//!
//! All three reports share one shape: optional banner lines, a header row
//! whose columns are separated by at least two spaces, a separator row of
//! dashes, then data rows whose tokens are separated by single spaces.
//!
//! The header is the guard against version drift: each report checks its
//! column count and a few column names, and a header that matches no known
//! layout makes the whole table come back empty. Individual rows that fail
//! to parse are reported to the [`StatusLogger`] and skipped; nothing in this
//! module returns an error.

pub mod locks;
pub mod processes;
pub mod shares;
pub mod timestamp;

pub use locks::parse_locks;
pub use processes::parse_processes;
pub use shares::{ShareLayout, ShareRowLayout, parse_shares};
pub use timestamp::{TimestampWindow, find_trailing_timestamp, parse_timestamp};

use crate::error::{RowError, TableError};
use crate::log::StatusLogger;
use crate::types::NO_CLUSTER_NODE;

/// Prefix identifying the separator row between header and data.
const SEPARATOR_PREFIX: &str = "----------------------------------------";

/// A report split around its separator row.
#[derive(Debug)]
pub(crate) struct Table<'a> {
    lines: Vec<&'a str>,
    separator: usize,
}

/// One non-blank data row.
#[derive(Debug)]
pub(crate) struct Row<'a> {
    /// 1-based line number within the report.
    pub number: usize,
    /// Raw line, for diagnostics.
    pub line: &'a str,
    /// Whitespace separated tokens.
    pub tokens: Vec<&'a str>,
}

impl<'a> Table<'a> {
    /// Finds the separator row; it must have a header line above it.
    pub(crate) fn locate(text: &'a str) -> Result<Self, TableError> {
        let lines: Vec<&str> = text.lines().collect();
        match lines.iter().position(|l| l.starts_with(SEPARATOR_PREFIX)) {
            Some(separator) if separator >= 1 => Ok(Self { lines, separator }),
            Some(_) => Err(TableError::MissingHeader),
            None => Err(TableError::MissingSeparator),
        }
    }

    /// Header columns, split on double spaces.
    pub(crate) fn header(&self) -> Vec<&'a str> {
        header_tokens(self.lines[self.separator - 1])
    }

    /// Returns the line `distance` rows above the separator.
    pub(crate) fn line_above(&self, distance: usize) -> Option<&'a str> {
        self.separator
            .checked_sub(distance)
            .and_then(|i| self.lines.get(i).copied())
    }

    /// Data rows after the separator, blank lines dropped.
    pub(crate) fn rows(&self) -> impl Iterator<Item = Row<'a>> + '_ {
        self.lines
            .iter()
            .enumerate()
            .skip(self.separator + 1)
            .filter_map(|(i, line)| {
                let tokens = row_tokens(line);
                (!tokens.is_empty()).then_some(Row {
                    number: i + 1,
                    line,
                    tokens,
                })
            })
    }
}

/// Splits a header line on double spaces, trimming and dropping empty cells.
pub(crate) fn header_tokens(line: &str) -> Vec<&str> {
    line.split("  ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Splits a data line into whitespace separated tokens.
pub(crate) fn row_tokens(line: &str) -> Vec<&str> {
    line.split_whitespace().collect()
}

/// Parses an unsigned column value.
pub(crate) fn parse_u32(field: &'static str, token: &str) -> Result<u32, RowError> {
    token
        .parse::<u32>()
        .map_err(|_| RowError::invalid_integer(field, token))
}

/// Parses a user or group id; any unsigned 32-bit value is accepted.
pub(crate) fn parse_account_id(field: &'static str, token: &str) -> Result<i64, RowError> {
    parse_u32(field, token).map(i64::from)
}

/// Parses a non-negative id that is stored in a signed sentinel field.
pub(crate) fn parse_id(field: &'static str, token: &str) -> Result<i32, RowError> {
    let value = parse_u32(field, token)?;
    i32::try_from(value).map_err(|_| RowError::invalid_integer(field, token))
}

/// Splits a `node:pid` token; a bare pid gets [`NO_CLUSTER_NODE`].
pub(crate) fn parse_process_id(token: &str) -> Result<(i32, u32), RowError> {
    match token.split_once(':') {
        Some((node, pid)) => Ok((parse_id("ClusterNodeId", node)?, parse_u32("PID", pid)?)),
        None => Ok((NO_CLUSTER_NODE, parse_u32("PID", token)?)),
    }
}

/// Parses every data row of a table, logging and skipping the failures.
pub(crate) fn collect_rows<'a, T>(
    table: &Table<'a>,
    report: &str,
    logger: &dyn StatusLogger,
    mut parse: impl FnMut(&[&'a str]) -> Result<T, RowError>,
) -> Vec<T> {
    table
        .rows()
        .filter_map(|row| match parse(&row.tokens) {
            Ok(record) => Some(record),
            Err(err) => {
                logger.error_with_addition(
                    &err,
                    &format!("while getting {report} line {}: {:?}", row.number, row.line),
                );
                None
            }
        })
        .collect()
}

/// Logs a table that is dropped as a whole.
pub(crate) fn report_table(logger: &dyn StatusLogger, report: &str, err: &TableError) {
    logger.error_with_addition(err, &format!("while reading the {report} table"));
}
