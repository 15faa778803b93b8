//! Shares table (`smbstatus -S -n`).
//!
//! Two table layouts exist. A plain server prints the service name and the
//! connection time; a clustered server prints user, group and protocol
//! instead, with no time at all. The plain layout has two row shapes that
//! differ only in how the time is printed.

use crate::error::{RowError, TableError};
use crate::log::StatusLogger;
use crate::types::ShareRecord;

use super::timestamp::parse_timestamp;
use super::{Table, collect_rows, parse_process_id, report_table};

/// Table layout, chosen from the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareLayout {
    /// `Service  pid  Machine  Connected at  Encryption  Signing`.
    Normal,
    /// `PID  Username  Group  Machine  Protocol Version  Encryption  Signing`.
    Cluster,
}

impl ShareLayout {
    /// Detects the layout from the split header.
    #[must_use]
    pub fn detect(header: &[&str]) -> Option<Self> {
        match header.len() {
            6 if header[0] == "Service" && header[3] == "Connected at" => Some(Self::Normal),
            7 if header[0] == "PID" && header[4] == "Protocol Version" => Some(Self::Cluster),
            _ => None,
        }
    }

    /// Picks the row shape for a row with `columns` tokens.
    #[must_use]
    pub const fn row_layout(self, columns: usize) -> Option<ShareRowLayout> {
        match (self, columns) {
            (Self::Normal, 12) => Some(ShareRowLayout::NormalMeridiem),
            (Self::Normal, 11) => Some(ShareRowLayout::NormalTwentyFourHour),
            (Self::Cluster, 8) => Some(ShareRowLayout::Cluster),
            _ => None,
        }
    }
}

/// Row shape within a [`ShareLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRowLayout {
    /// Time as `Sun May 16 02:07:02 PM 2021 CEST`.
    NormalMeridiem,
    /// Time as `Sun May 16 14:07:02 2021 CEST`.
    NormalTwentyFourHour,
    /// Machine spans two tokens, no time.
    Cluster,
}

impl ShareRowLayout {
    /// Token count of the row shape.
    #[must_use]
    pub const fn columns(self) -> usize {
        match self {
            Self::NormalMeridiem => 12,
            Self::NormalTwentyFourHour => 11,
            Self::Cluster => 8,
        }
    }

    /// Parses a row that has exactly [`Self::columns`] tokens.
    ///
    /// # Errors
    /// Returns the reason the row cannot be read.
    pub fn parse(self, tokens: &[&str]) -> Result<ShareRecord, RowError> {
        let columns = self.columns();
        if tokens.len() != columns {
            return Err(RowError::UnknownLayout(tokens.len()));
        }

        match self {
            Self::NormalMeridiem | Self::NormalTwentyFourHour => {
                let (cluster_node_id, process_id) = parse_process_id(tokens[1])?;
                let connected_at = parse_timestamp(&tokens[3..columns - 2])
                    .ok_or(RowError::MissingTimestamp)?;
                Ok(ShareRecord {
                    service: tokens[0].to_string(),
                    process_id,
                    cluster_node_id,
                    machine: tokens[2].to_string(),
                    connected_at: Some(connected_at),
                    encryption: tokens[columns - 2].to_string(),
                    signing: tokens[columns - 1].to_string(),
                })
            }
            Self::Cluster => {
                let (cluster_node_id, process_id) = parse_process_id(tokens[0])?;
                Ok(ShareRecord {
                    service: String::new(),
                    process_id,
                    cluster_node_id,
                    machine: format!("{} {}", tokens[3], tokens[4]),
                    connected_at: None,
                    encryption: tokens[6].to_string(),
                    signing: tokens[7].to_string(),
                })
            }
        }
    }
}

/// Parses the shares report.
///
/// Never fails: unexpected tables come back empty and bad rows are skipped,
/// each reported to `logger`.
#[must_use]
pub fn parse_shares(text: &str, logger: &dyn StatusLogger) -> Vec<ShareRecord> {
    let table = match Table::locate(text) {
        Ok(table) => table,
        Err(err) => {
            report_table(logger, "ShareData", &err);
            return Vec::new();
        }
    };

    let header = table.header();
    let Some(layout) = ShareLayout::detect(&header) else {
        report_table(logger, "ShareData", &TableError::unknown_header(&header));
        return Vec::new();
    };

    collect_rows(&table, "ShareData", logger, |tokens| {
        layout
            .row_layout(tokens.len())
            .ok_or(RowError::UnknownLayout(tokens.len()))?
            .parse(tokens)
    })
}
