//! # Storage Errors
//!
//! Error types for document resolution.

use thiserror::Error;

/// Result type for document store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised while resolving a document for a result row
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// No document exists under this ID
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document exists but the named revision does not
    #[error("Revision not found: {doc_id} @ {rev_id}")]
    RevisionNotFound { doc_id: String, rev_id: String },

    /// The current revision is a deletion tombstone
    #[error("Document deleted: {0}")]
    Deleted(String),

    /// The backing store failed to produce the document body
    #[error("Read failed for {doc_id}: {reason}")]
    ReadFailed { doc_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_names_the_document() {
        let err = StorageError::NotFound("order-17".to_string());
        assert!(err.to_string().contains("order-17"));

        let err = StorageError::RevisionNotFound {
            doc_id: "order-17".to_string(),
            rev_id: "2".to_string(),
        };
        assert!(err.to_string().contains("order-17"));
        assert!(err.to_string().contains('2'));
    }
}
