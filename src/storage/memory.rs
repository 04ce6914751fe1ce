//! In-memory document store
//!
//! Reference [`DocumentStore`] used by embedders without a host database and
//! by the test suite. Keeps the full linear revision history of every
//! document so that rows can pin older revisions. Attachments and conflict
//! branches are not modeled; those content flags are accepted and ignored.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::errors::{StorageError, StorageResult};
use super::{ContentOptions, DocumentStore, ResolvedDocument, SequenceNumber};

#[derive(Debug, Clone)]
struct StoredRevision {
    rev_id: String,
    sequence: SequenceNumber,
    properties: Map<String, Value>,
    deleted: bool,
}

#[derive(Debug, Clone, Default)]
struct StoredDocument {
    /// Oldest first; the last entry is the current revision
    revisions: Vec<StoredRevision>,
}

/// In-memory document store with per-document revision history.
///
/// Revision IDs are generation numbers ("1", "2", ...) assigned on write.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    docs: HashMap<String, StoredDocument>,
    unreadable: HashSet<String>,
    last_sequence: SequenceNumber,
}

impl MemoryDocumentStore {
    /// Creates an empty store at sequence 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a new revision of a document and returns its sequence.
    ///
    /// Bodies are JSON objects; any other value stores an empty body.
    pub fn put(&mut self, doc_id: &str, properties: Value) -> SequenceNumber {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.last_sequence += 1;
        let sequence = self.last_sequence;
        let doc = self.docs.entry(doc_id.to_string()).or_default();
        doc.revisions.push(StoredRevision {
            rev_id: (doc.revisions.len() + 1).to_string(),
            sequence,
            properties,
            deleted: false,
        });
        sequence
    }

    /// Appends a deletion tombstone; returns its sequence, or `None` for an
    /// unknown document.
    pub fn delete(&mut self, doc_id: &str) -> Option<SequenceNumber> {
        if !self.docs.contains_key(doc_id) {
            return None;
        }
        self.last_sequence += 1;
        let sequence = self.last_sequence;
        let doc = self.docs.get_mut(doc_id)?;
        doc.revisions.push(StoredRevision {
            rev_id: (doc.revisions.len() + 1).to_string(),
            sequence,
            properties: Map::new(),
            deleted: true,
        });
        Some(sequence)
    }

    /// Makes every read of this document fail with `ReadFailed`
    pub fn mark_unreadable(&mut self, doc_id: &str) {
        self.unreadable.insert(doc_id.to_string());
    }

    /// Sequence of the current revision, if the document exists
    pub fn sequence_of(&self, doc_id: &str) -> Option<SequenceNumber> {
        let doc = self.docs.get(doc_id)?;
        doc.revisions.last().map(|r| r.sequence)
    }

    /// Highest sequence assigned so far
    pub fn last_sequence(&self) -> SequenceNumber {
        self.last_sequence
    }

    /// Number of documents, tombstoned ones included
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Returns true if no document was ever written
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get_document(
        &self,
        doc_id: &str,
        rev_id: Option<&str>,
        content: &ContentOptions,
    ) -> StorageResult<ResolvedDocument> {
        if self.unreadable.contains(doc_id) {
            return Err(StorageError::ReadFailed {
                doc_id: doc_id.to_string(),
                reason: "marked unreadable".to_string(),
            });
        }
        let doc = self
            .docs
            .get(doc_id)
            .ok_or_else(|| StorageError::NotFound(doc_id.to_string()))?;

        let revision = match rev_id {
            // A pinned revision resolves even past later updates or deletion
            Some(rev_id) => doc
                .revisions
                .iter()
                .rev()
                .find(|r| r.rev_id == rev_id)
                .ok_or_else(|| StorageError::RevisionNotFound {
                    doc_id: doc_id.to_string(),
                    rev_id: rev_id.to_string(),
                })?,
            None => match doc.revisions.last() {
                Some(current) if current.deleted => {
                    return Err(StorageError::Deleted(doc_id.to_string()))
                }
                Some(current) => current,
                None => return Err(StorageError::NotFound(doc_id.to_string())),
            },
        };

        let mut properties = if content.omit_body {
            Map::new()
        } else {
            revision.properties.clone()
        };
        properties.insert("_id".to_string(), Value::String(doc_id.to_string()));
        properties.insert("_rev".to_string(), Value::String(revision.rev_id.clone()));
        if revision.deleted {
            properties.insert("_deleted".to_string(), Value::Bool(true));
        }
        if content.include_local_seq {
            properties.insert("_local_seq".to_string(), Value::from(revision.sequence));
        }

        Ok(ResolvedDocument {
            properties,
            sequence: revision.sequence,
        })
    }
}
