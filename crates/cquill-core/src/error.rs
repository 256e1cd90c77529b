use thiserror::Error as ThisError;

///
/// Error
/// Every fallible surface of the crate returns this enum. Statement
/// constructors fail with `Validation`, single-row reads that match
/// nothing fail with `RowNotFound`, and injected test errors are
/// surfaced verbatim as whatever variant the injector carries.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("row not found")]
    RowNotFound,

    #[error("scan: {0}")]
    Scan(String),

    #[error("empty value for primary key column {column}")]
    EmptyPrimaryKey { column: String },

    #[error("list index {index} out of range for column {column} (len {len})")]
    ListIndexOutOfRange {
        column: String,
        index: i64,
        len: usize,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Injected(String),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn scan(message: impl Into<String>) -> Self {
        Self::Scan(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    /// True when a single-row read found no row. Empty results on slice
    /// reads are not an error and never produce this.
    #[must_use]
    pub const fn is_row_not_found(&self) -> bool {
        matches!(self, Self::RowNotFound)
    }
}
