//! Processes table (`smbstatus -p -n`).
//!
//! Unlike the other reports this one carries a banner two lines above the
//! separator, which is where the server version comes from.

use crate::error::{RowError, TableError};
use crate::log::StatusLogger;
use crate::types::{ProcessRecord, UNKNOWN_ID};

use super::{Table, collect_rows, parse_account_id, parse_process_id, report_table};

const BANNER_PREFIX: &str = "Samba version";

const HEADER_COLUMNS: usize = 7;

/// Tokens per row; the machine column spans two of them.
const ROW_COLUMNS: usize = 8;

/// Parses the processes report.
///
/// Never fails: unexpected tables come back empty and bad rows are skipped,
/// each reported to `logger`.
#[must_use]
pub fn parse_processes(text: &str, logger: &dyn StatusLogger) -> Vec<ProcessRecord> {
    let table = match Table::locate(text) {
        Ok(table) => table,
        Err(err) => {
            report_table(logger, "ProcessData", &err);
            return Vec::new();
        }
    };

    let Some(server_version) = table
        .line_above(2)
        .and_then(|line| line.trim().strip_prefix(BANNER_PREFIX))
        .map(|version| version.trim().to_string())
    else {
        report_table(logger, "ProcessData", &TableError::MissingBanner);
        return Vec::new();
    };

    let header = table.header();
    if !is_process_header(&header) {
        report_table(logger, "ProcessData", &TableError::unknown_header(&header));
        return Vec::new();
    }

    collect_rows(&table, "ProcessData", logger, |tokens| {
        parse_process_row(tokens, &server_version)
    })
}

fn is_process_header(header: &[&str]) -> bool {
    header.len() == HEADER_COLUMNS && header[1] == "Username" && header[4] == "Protocol Version"
}

fn parse_process_row(tokens: &[&str], server_version: &str) -> Result<ProcessRecord, RowError> {
    if tokens.len() != ROW_COLUMNS {
        return Err(RowError::UnknownLayout(tokens.len()));
    }

    let (cluster_node_id, process_id) = parse_process_id(tokens[0])?;
    let user_id = match tokens[1] {
        "nobody" => UNKNOWN_ID,
        token => parse_account_id("UserID", token)?,
    };
    let group_id = match tokens[2] {
        "nogroup" => UNKNOWN_ID,
        token => parse_account_id("GroupID", token)?,
    };

    Ok(ProcessRecord {
        process_id,
        cluster_node_id,
        user_id,
        group_id,
        machine: format!("{} {}", tokens[3], tokens[4]),
        protocol_version: tokens[5].to_string(),
        encryption: tokens[6].to_string(),
        signing: tokens[7].to_string(),
        server_version: server_version.to_string(),
    })
}
