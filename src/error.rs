use thiserror::Error;

/// Errors produced by the fetch and preprocessing stages.
///
/// Every variant is terminal for a run: nothing is retried past the fetcher's own
/// backoff, and no partial output is written.
#[derive(Debug, Error)]
pub enum PrepError {
    // ── Fetch ────────────────────────────────────────────────────────────────
    #[error("fetch of {url} failed: {message}")]
    Fetch { url: String, message: String },

    // ── Input shape ──────────────────────────────────────────────────────────
    #[error("input is missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("line {line}, column `{column}`: cannot parse {value:?} ({reason})")]
    Parse {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    // ── Underlying codecs / storage ──────────────────────────────────────────
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

impl PrepError {
    pub(crate) fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        PrepError::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn parse(
        line: u64,
        column: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        PrepError::Parse {
            line,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
