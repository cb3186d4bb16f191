use thiserror::Error;

use crate::reconcile::ReconcileReport;

/// Errors that can occur while parsing or reconciling statement text
#[derive(Error, Debug)]
pub enum StatementParseError {
    /// Statement text matched neither pipeline's markers
    #[error("Unsupported statement format")]
    UnsupportedFormat,

    /// Failed to read statement text from disk
    #[error("Failed to read file content: {0}")]
    ReadContentFailed(#[from] std::io::Error),

    /// The builder was called with neither content nor a file path
    #[error("Content or filepath is required")]
    MissingContentAndFilepath,

    /// A parser's line grammar failed to compile
    #[error("Invalid line grammar: {0}")]
    PatternInvalid(#[from] regex::Error),

    // ── Token-level errors ──────────────────────────────────────────────────

    /// An amount token whose digits did not survive normalization
    #[error("Invalid amount token")]
    AmountInvalidFormat,

    /// A date token that is malformed or not a valid calendar date
    #[error("Invalid date token")]
    DateInvalidFormat,

    // ── Reconciliation ──────────────────────────────────────────────────────

    /// Computed and printed totals disagree beyond tolerance; the report
    /// carries the disagreement values, sample rows and unparsed lines
    #[error("Reconciliation mismatch:\n{0}")]
    ReconciliationMismatch(ReconcileReport),

    /// Failed to write register rows
    #[error("Failed to write register: {0}")]
    RegisterWriteFailed(#[from] csv::Error),
}

/// Convenient alias for Result with the crate's main error type
pub type StatementResult<T> = Result<T, StatementParseError>;
