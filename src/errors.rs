//! Error types for the conversion pipeline

use std::io;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion run
///
/// None of these are recoverable: a conversion either produces a complete
/// [`Api`](crate::model::Api) or fails as a whole.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A generic signature or type descriptor does not follow the grammar
    #[error("Parse failed: {0}")]
    ParseFailed(String),

    /// The input records are inconsistent with the source format the
    /// converter expects (e.g. a missing outer-instance constructor parameter)
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    /// Reading the raw class containers failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}
