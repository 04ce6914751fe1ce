//! View Index subsystem for facetdb
//!
//! A view's index is an ordered collection of (key, value, docID, sequence)
//! entries produced by a map function. The query core only reads it, through
//! the [`ViewIndex`] trait: construction and incremental maintenance belong
//! to the host database.
//!
//! # Design Principles
//!
//! - Read-only boundary: enumeration never mutates the index
//! - Deterministic order: entries sort by collated key, then document ID
//! - Lazy cursors: enumeration yields entries one at a time, never a batch
//!
//! # Invariants
//!
//! - Enumeration order is total and stable across repeated queries
//! - Range bounds and explicit key probes resolve against the same collation
//!   that ordered the entries
//! - A cursor is released by dropping it; no explicit close

mod errors;
mod memory;

pub use errors::{IndexError, IndexResult};
pub use memory::{MemoryFullTextIndex, MemoryViewIndex};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::storage::SequenceNumber;

/// What kind of entries an index holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Ordered key/value entries emitted by a map function
    Value,
    /// Tokenized text postings, queried through [`FullTextSearch`]
    FullText,
}

/// One stored index entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Emitted key, ordered by collation
    pub key: Value,
    /// Emitted value; `None` when the map function emitted no value
    pub value: Option<Value>,
    /// Document that emitted this entry
    pub doc_id: String,
    /// Sequence of the emitting document revision
    pub sequence: SequenceNumber,
}

impl IndexEntry {
    /// Creates an entry
    pub fn new(
        key: Value,
        value: impl Into<Option<Value>>,
        doc_id: impl Into<String>,
        sequence: SequenceNumber,
    ) -> Self {
        Self {
            key,
            value: value.into(),
            doc_id: doc_id.into(),
            sequence,
        }
    }
}

/// Bounds and paging for one enumeration.
///
/// `start_key`/`end_key` are named for iteration order: when `descending` is
/// set the enumerator swaps their roles internally, so the start key is the
/// high end of the range. `keys` takes precedence over the range bounds and
/// probes each key in the order given. `inclusive_end` governs the end bound
/// only; the start bound is always included.
#[derive(Debug, Clone)]
pub struct EnumerateSpec {
    pub start_key: Option<Value>,
    pub end_key: Option<Value>,
    /// Disambiguates duplicate keys at the start bound
    pub start_doc_id: Option<String>,
    /// Disambiguates duplicate keys at the end bound
    pub end_doc_id: Option<String>,
    pub keys: Option<Vec<Value>>,
    pub descending: bool,
    pub inclusive_end: bool,
    pub skip: usize,
    /// `None` means unbounded
    pub limit: Option<usize>,
}

impl Default for EnumerateSpec {
    fn default() -> Self {
        Self {
            start_key: None,
            end_key: None,
            start_doc_id: None,
            end_doc_id: None,
            keys: None,
            descending: false,
            inclusive_end: true,
            skip: 0,
            limit: None,
        }
    }
}

/// Entry cursor borrowed from an index.
pub type Entries<'a> = Box<dyn Iterator<Item = IndexEntry> + 'a>;

/// Document-ID cursor produced by a full-text match.
pub type DocIds<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// Read access to a view's index.
pub trait ViewIndex {
    /// Reports what kind of index this is.
    fn kind(&self) -> IndexKind;

    /// Opens an ordered cursor over the entries selected by `spec`.
    fn enumerate(&self, spec: &EnumerateSpec) -> IndexResult<Entries<'_>>;

    /// The full-text capability, for indexes whose kind supports it.
    fn full_text(&self) -> Option<&dyn FullTextSearch> {
        None
    }
}

/// Word matching over tokenized document text.
///
/// The query core passes the raw search string; tokenization is the
/// implementation's concern. With `match_all` set, only documents containing
/// every word match.
pub trait FullTextSearch {
    /// IDs of matching documents, in the implementation's own order.
    fn docs_containing_words(&self, query: &str, match_all: bool) -> IndexResult<DocIds<'_>>;
}
