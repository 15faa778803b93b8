//! Worker process listing via `ps`.

use smbx_core::{PsRecord, RowError};

/// Arguments giving one headerless line per process:
/// pid, %cpu, %mem, rss (KiB), vsz (KiB), threads, command.
pub const PS_ARGS: [&str; 3] = ["-e", "-o", "pid=,pcpu=,pmem=,rss=,vsz=,nlwp=,comm="];

const COLUMNS: usize = 7;

/// Parses `ps` output, keeping processes whose command is `process_name`.
///
/// Malformed lines are logged and skipped.
#[must_use]
pub fn parse_ps(output: &str, process_name: &str) -> Vec<PsRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match parse_ps_line(line) {
            Ok(record) => Some(record),
            Err(err) => {
                tracing::warn!(error = %err, line = %line, "skipping ps line");
                None
            }
        })
        .filter(|record| record.command == process_name)
        .collect()
}

fn parse_ps_line(line: &str) -> Result<PsRecord, RowError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < COLUMNS {
        return Err(RowError::TooFewColumns {
            expected: COLUMNS,
            actual: tokens.len(),
        });
    }

    Ok(PsRecord {
        process_id: integer("pid", tokens[0])?,
        cpu_percent: number("pcpu", tokens[1])?,
        memory_percent: number("pmem", tokens[2])?,
        resident_bytes: integer::<u64>("rss", tokens[3])?.saturating_mul(1024),
        virtual_bytes: integer::<u64>("vsz", tokens[4])?.saturating_mul(1024),
        threads: integer("nlwp", tokens[5])?,
        // comm may contain spaces
        command: tokens[COLUMNS - 1..].join(" "),
    })
}

fn integer<T: std::str::FromStr>(field: &'static str, token: &str) -> Result<T, RowError> {
    token
        .parse()
        .map_err(|_| RowError::invalid_integer(field, token))
}

fn number(field: &'static str, token: &str) -> Result<f64, RowError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| RowError::invalid_number(field, token))
}
