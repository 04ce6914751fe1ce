//! # Query Errors
//!
//! Construction-time failures of the query dispatcher. Once a row producer
//! exists, pulling from it never fails: per-row problems (a document that
//! will not load, a reduce function that throws) degrade the affected row
//! and are reported through the observability channel instead.

use thiserror::Error;

/// Result type for query construction
pub type QueryResult<T> = Result<T, QueryError>;

/// Failures that abort a query before any row is produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The view has no index to enumerate
    #[error("View has no index: {0}")]
    NotFound(String),

    /// The index exists but is the wrong kind for the requested shape
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A query option asked for something the view cannot provide
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// A collaborator failed while the producer was being set up
    #[error("Database error: {0}")]
    Db(String),
}
