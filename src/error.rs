// =============================================================================
// Data loading errors
// =============================================================================
//
// Missing indicators are not errors; they are `None` values on the enriched
// row. Only ingestion can fail.
// =============================================================================

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    /// A row could not be accepted as-is. Aborts the whole load.
    #[error("invalid row at line {line} (symbol {symbol}, date {date}): {field} = {value:?}: {reason}")]
    Validation {
        line: u64,
        symbol: String,
        date: String,
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// The header row lacks a column the loader needs.
    #[error("missing required column {column:?} in {source_name}")]
    MissingColumn {
        column: &'static str,
        source_name: String,
    },

    /// The source file does not exist or cannot be opened.
    #[error("data source {path} is unavailable: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed CSV framing (unbalanced quotes, I/O failure mid-read, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DataError {
    /// Whether the service may start without this dataset.
    ///
    /// Unavailable sources degrade to an empty dataset; bad contents do not.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Unavailable { .. } => true,
            Self::Csv(e) => e.is_io_error(),
            _ => false,
        }
    }
}
