use thiserror::Error;

/// Convenience result type for the in-memory engine ([`crate::series`], [`crate::frame`],
/// [`crate::expr`]).
pub type DataResult<T> = Result<T, DataError>;

/// Convenience result type for CSV ingestion and serialization.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by [`crate::series::Series`], [`crate::frame::DataFrame`] and
/// [`crate::expr::SeriesExpression`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A column label was looked up but is not part of the frame.
    #[error("column not found: '{label}'")]
    ColumnNotFound { label: String },

    /// A column with this label already exists in the frame.
    #[error("duplicate column label: '{label}'")]
    DuplicateColumn { label: String },

    /// A series (or binary operand) does not have the expected number of rows.
    #[error("length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A row does not have one value per column.
    #[error("row width mismatch: frame has {expected} columns, row has {actual} values")]
    RowWidthMismatch { expected: usize, actual: usize },

    /// A row index is outside `0..row_count`.
    #[error("row index {index} out of range for {row_count} rows")]
    RowOutOfRange { index: usize, row_count: usize },

    /// A numeric-only operation was requested on a non-numeric column.
    #[error("column '{label}' is not numeric (dtype: {dtype})")]
    NotNumeric { label: String, dtype: String },

    /// Unknown method name for `fill_na` / `normalize`.
    #[error("invalid {kind} method '{name}' (expected one of: {expected})")]
    InvalidMethod {
        kind: &'static str,
        name: String,
        expected: &'static str,
    },

    /// `drop_na` axis other than 0 (rows) or 1 (columns).
    #[error("invalid axis {0}: only 0 (rows) or 1 (columns) are accepted")]
    InvalidAxis(i64),

    /// `drop_na` threshold outside `[0, 1]`.
    #[error("invalid threshold {0}: must be within [0, 1]")]
    InvalidThreshold(f64),

    /// An arithmetic operand at `position` cannot take part in numeric arithmetic.
    #[error("cannot apply '{op}' to non-numeric value '{value}' at row {position}")]
    InvalidOperand {
        op: char,
        value: String,
        position: usize,
    },

    /// The median index (derived from the full column length) points past the non-null values.
    #[error(
        "median index {index} is out of range for column '{label}' ({available} non-null values)"
    )]
    MedianOutOfRange {
        label: String,
        index: usize,
        available: usize,
    },

    /// A malformed or unevaluable expression.
    #[error("expression error: {message}")]
    Expression { message: String },
}

impl DataError {
    pub(crate) fn expression(message: impl Into<String>) -> Self {
        Self::Expression {
            message: message.into(),
        }
    }
}

/// Error type returned by the CSV boundary ([`crate::io`]).
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizing/serialization error (ragged records, invalid UTF-8, ...).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// The input has no usable header row.
    #[error("header mismatch: {message}")]
    HeaderMismatch { message: String },

    /// The parsed table could not be turned into a frame.
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Error type returned by [`crate::session::Session`] commands.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the table failed.
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    /// The transform itself failed.
    #[error(transparent)]
    Data(#[from] DataError),
}

/// Convenience result type for session commands.
pub type SessionResult<T> = Result<T, SessionError>;
