use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, TakeoverError>;

/// Errors that can occur while loading, verifying or rendering fingerprints
#[derive(Error, Debug)]
pub enum TakeoverError {
    /// The input document has no content at all
    #[error("input document is empty")]
    EmptyDocument,

    /// The fingerprint table marker or its rows could not be found
    #[error("no fingerprint table found: {0}")]
    MissingTable(String),

    /// A table row could not be destructured into the expected columns
    #[error("malformed row {line}: {message}")]
    MalformedRow {
        /// 1-based line number within the table section
        line: usize,
        /// What was wrong with the row
        message: String,
    },

    /// The probe client could not be constructed
    #[error("client error: {0}")]
    Client(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TakeoverError {
    /// Returns true if the error means there is nothing to verify
    #[must_use]
    pub const fn is_missing_input(&self) -> bool {
        matches!(self, Self::EmptyDocument | Self::MissingTable(_))
    }
}
