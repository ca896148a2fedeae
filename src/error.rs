use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::MonetaryColumn;

/// A monetary string that does not match `[€] digits[,digits] [M|K]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid currency amount '{raw}': {reason}")]
pub struct CurrencyError {
    pub raw: String,
    pub reason: &'static str,
}

impl CurrencyError {
    pub(crate) fn new(raw: &str, reason: &'static str) -> Self {
        Self {
            raw: raw.to_string(),
            reason,
        }
    }
}

/// A single monetary cell that failed to normalize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: column '{}' could not be parsed", .column.source_header())]
pub struct FieldParseError {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub column: MonetaryColumn,
    #[source]
    pub source: CurrencyError,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("line {line}: invalid age '{raw}'")]
    InvalidAge { line: usize, raw: String },

    #[error("column '{}' has no parseable values to impute from", .column.source_header())]
    NoParseableValues { column: MonetaryColumn },

    #[error(transparent)]
    Field(#[from] FieldParseError),
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
