//! # Index Errors
//!
//! Error types for index enumeration and full-text matching. These surface
//! to callers as database errors at query-open time; once a cursor is open
//! the index yields entries infallibly.

use thiserror::Error;

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// Failures reported by an index collaborator
#[derive(Debug, Clone, Error)]
pub enum IndexError {
    /// The index's backing state could not be read
    #[error("Index unavailable: {0}")]
    Unavailable(String),

    /// The full-text capability failed to run the match
    #[error("Full-text search failed: {0}")]
    SearchFailed(String),
}
