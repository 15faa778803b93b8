//! Locked files table (`smbstatus -L -n`).

use crate::error::{RowError, TableError};
use crate::log::StatusLogger;
use crate::types::LockRecord;

use super::{Table, collect_rows, parse_account_id, parse_process_id, report_table};
use super::timestamp::find_trailing_timestamp;

/// Whole-report text printed when nothing is locked.
pub const NO_LOCKED_FILES: &str = "No locked files";

/// Header column count.
const HEADER_COLUMNS: usize = 9;

/// Columns before the file name: pid, uid, deny mode, access, r/w, oplock,
/// share path.
const FIXED_COLUMNS: usize = 7;

/// Parses the locked files report.
///
/// Never fails: unexpected tables come back empty and bad rows are skipped,
/// each reported to `logger`.
#[must_use]
pub fn parse_locks(text: &str, logger: &dyn StatusLogger) -> Vec<LockRecord> {
    if text.trim() == NO_LOCKED_FILES {
        return Vec::new();
    }

    let table = match Table::locate(text) {
        Ok(table) => table,
        Err(err) => {
            report_table(logger, "LockData", &err);
            return Vec::new();
        }
    };

    let header = table.header();
    if !is_lock_header(&header) {
        report_table(logger, "LockData", &TableError::unknown_header(&header));
        return Vec::new();
    }

    collect_rows(&table, "LockData", logger, parse_lock_row)
}

fn is_lock_header(header: &[&str]) -> bool {
    header.len() == HEADER_COLUMNS && header[0] == "Pid" && header[5] == "Oplock"
}

/// Parses one data row; the file name may contain spaces.
pub(crate) fn parse_lock_row(tokens: &[&str]) -> Result<LockRecord, RowError> {
    if tokens.len() < FIXED_COLUMNS {
        return Err(RowError::TooFewColumns {
            expected: FIXED_COLUMNS,
            actual: tokens.len(),
        });
    }

    let (cluster_node_id, process_id) = parse_process_id(tokens[0])?;
    let user_id = parse_account_id("UserID", tokens[1])?;

    let (timestamp, name_end) =
        find_trailing_timestamp(tokens).ok_or(RowError::MissingTimestamp)?;
    if name_end <= FIXED_COLUMNS {
        return Err(RowError::MissingName);
    }

    Ok(LockRecord {
        process_id,
        cluster_node_id,
        user_id,
        deny_mode: tokens[2].to_string(),
        access: tokens[3].to_string(),
        access_mode: tokens[4].to_string(),
        oplock: tokens[5].to_string(),
        share_path: tokens[6].to_string(),
        name: tokens[FIXED_COLUMNS..name_end].join(" "),
        timestamp,
    })
}
