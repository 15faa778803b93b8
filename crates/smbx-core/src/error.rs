//! Error types for smbx-core.
//!
//! Parsing never surfaces an error to its caller: a [`RowError`] only names the
//! reason one report line was skipped, and is handed to the logger capability.

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, SmbxError>;

/// Errors raised while loading configuration or other non-parsing work.
#[derive(Debug, thiserror::Error)]
pub enum SmbxError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SmbxError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }
}

/// Reason a single report line was dropped by the table parser.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// A numeric column did not hold an unsigned integer.
    #[error("invalid integer {value:?} in field {field}")]
    InvalidInteger {
        /// Name of the offending sub-field.
        field: &'static str,
        /// Raw token found in the line.
        value: String,
    },

    /// A decimal column did not hold a number.
    #[error("invalid number {value:?} in field {field}")]
    InvalidNumber {
        /// Name of the offending sub-field.
        field: &'static str,
        /// Raw token found in the line.
        value: String,
    },

    /// Fewer columns than the fixed layout requires.
    #[error("expected at least {expected} columns, found {actual}")]
    TooFewColumns {
        /// Minimum column count.
        expected: usize,
        /// Column count of the line.
        actual: usize,
    },

    /// Column count matches no known row layout.
    #[error("no known row layout has {0} columns")]
    UnknownLayout(usize),

    /// No trailing token window parsed as a timestamp.
    #[error("no timestamp found at the end of the line")]
    MissingTimestamp,

    /// The timestamp left no tokens for the name column.
    #[error("no name found between share path and timestamp")]
    MissingName,
}

/// Reason a whole report table was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// No separator row of dashes.
    #[error("no separator line found")]
    MissingSeparator,

    /// Separator row on the first line, so there is no header.
    #[error("separator line has no header above it")]
    MissingHeader,

    /// Header columns match no known layout.
    #[error("unexpected table header {0:?}")]
    UnknownHeader(Vec<String>),

    /// Processes report without its `Samba version` banner.
    #[error("no 'Samba version' banner above the header")]
    MissingBanner,
}

impl TableError {
    /// Creates an unknown header error from the split header.
    #[must_use]
    pub fn unknown_header(header: &[&str]) -> Self {
        Self::UnknownHeader(header.iter().map(ToString::to_string).collect())
    }
}

impl RowError {
    /// Creates an invalid integer error.
    #[must_use]
    pub fn invalid_integer(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidInteger {
            field,
            value: value.into(),
        }
    }

    /// Creates an invalid number error.
    #[must_use]
    pub fn invalid_number(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidNumber {
            field,
            value: value.into(),
        }
    }

    /// Returns the offending sub-field name, when the error is tied to one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidInteger { field, .. } | Self::InvalidNumber { field, .. } => Some(*field),
            _ => None,
        }
    }
}
