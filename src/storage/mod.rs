//! Document Store subsystem for facetdb
//!
//! The query core never owns document persistence. It resolves full document
//! bodies through the [`DocumentStore`] trait when a query asks for them, and
//! treats every failure of that collaborator as degradable (the row is still
//! emitted, just without a body).
//!
//! # Design Principles
//!
//! - Read-only boundary: the query core never writes through this interface
//! - Revision-addressable: a row can pin a specific revision (linked documents)
//! - Failures degrade rows, they never abort a scan
//!
//! [`MemoryDocumentStore`] is the in-process reference implementation used by
//! embedders and tests.

mod errors;
mod memory;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryDocumentStore;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Monotonically increasing per-database revision counter.
///
/// Synthetic rows (grouped, full-text) carry sequence 0.
pub type SequenceNumber = u64;

/// How much of a resolved document to materialize on a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOptions {
    /// Inline attachment metadata under `_attachments`
    pub include_attachments: bool,
    /// List conflicting revision IDs under `_conflicts`
    pub include_conflicts: bool,
    /// Stamp the store's sequence under `_local_seq`
    pub include_local_seq: bool,
    /// Return only document metadata, no user properties
    pub omit_body: bool,
}

/// A document body resolved for one result row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDocument {
    /// Document properties, metadata fields (`_id`, `_rev`, ...) included
    pub properties: Map<String, Value>,
    /// Sequence at which this revision was written
    pub sequence: SequenceNumber,
}

/// Read access to the host database's documents.
///
/// `rev_id` of `None` means the current revision. Implementations decide what
/// each [`ContentOptions`] flag costs; the query core only forwards them.
pub trait DocumentStore {
    /// Resolves one document, or reports why it cannot be loaded.
    fn get_document(
        &self,
        doc_id: &str,
        rev_id: Option<&str>,
        content: &ContentOptions,
    ) -> StorageResult<ResolvedDocument>;
}
