//! Query options
//!
//! One immutable configuration per query. The dispatcher reads it exactly
//! once to pick an execution shape; the chosen executor projects the range
//! and paging fields into an [`EnumerateSpec`] for the index.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::index::EnumerateSpec;
use crate::storage::ContentOptions;

use super::result::QueryRow;

/// Caller-supplied post-predicate over produced rows.
///
/// When a filter is set, `skip` and `limit` count rows that pass it, so the
/// enumerator runs unpaged and paging is re-applied after filtering.
pub type RowFilter = dyn Fn(&QueryRow) -> bool + Send + Sync;

/// Per-query configuration.
///
/// `reduce` of `None` means the caller did not say; reducing then follows
/// whether the view has a reduce function configured. `Some(true)` on a view
/// without one is a `BadParam` error.
#[derive(Clone)]
pub struct QueryOptions {
    /// Low end of the key range in iteration order
    pub start_key: Option<Value>,
    /// High end of the key range in iteration order
    pub end_key: Option<Value>,
    /// Disambiguates duplicate keys at the start bound
    pub start_key_doc_id: Option<String>,
    /// Disambiguates duplicate keys at the end bound
    pub end_key_doc_id: Option<String>,
    /// Explicit keys to probe instead of a contiguous range
    pub keys: Option<Vec<Value>>,
    /// Rows to drop before the first emitted one
    pub skip: usize,
    /// Cap on emitted rows; `None` means unbounded
    pub limit: Option<usize>,
    /// Iterate high-to-low; start/end bound roles swap
    pub descending: bool,
    /// Whether the end bound itself is included
    pub inclusive_end: bool,
    /// Resolve and attach full document bodies
    pub include_docs: bool,
    /// How much of a resolved document to load
    pub content: ContentOptions,
    /// Group rows by whole key
    pub group: bool,
    /// Group rows by a key prefix of this length; 0 means whole key
    pub group_level: u32,
    /// Explicit reduce on/off; `None` falls back to the view
    pub reduce: Option<bool>,
    /// Full-text search string; takes precedence over every other shape
    pub full_text_query: Option<String>,
    /// Post-predicate on rows; not applied to the full-text shape
    pub filter: Option<Arc<RowFilter>>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            start_key: None,
            end_key: None,
            start_key_doc_id: None,
            end_key_doc_id: None,
            keys: None,
            skip: 0,
            limit: None,
            descending: false,
            inclusive_end: true,
            include_docs: false,
            content: ContentOptions::default(),
            group: false,
            group_level: 0,
            reduce: None,
            full_text_query: None,
            filter: None,
        }
    }
}

impl QueryOptions {
    /// Projects the range and paging fields into an enumerator spec.
    ///
    /// With a row filter present, skip and limit are withheld from the
    /// enumerator and re-applied to rows that pass the filter.
    pub(crate) fn enumerate_spec(&self) -> EnumerateSpec {
        let paged = self.filter.is_none();
        EnumerateSpec {
            start_key: self.start_key.clone(),
            end_key: self.end_key.clone(),
            start_doc_id: self.start_key_doc_id.clone(),
            end_doc_id: self.end_key_doc_id.clone(),
            keys: self.keys.clone(),
            descending: self.descending,
            inclusive_end: self.inclusive_end,
            skip: if paged { self.skip } else { 0 },
            limit: if paged { self.limit } else { None },
        }
    }
}

impl fmt::Debug for QueryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryOptions")
            .field("start_key", &self.start_key)
            .field("end_key", &self.end_key)
            .field("start_key_doc_id", &self.start_key_doc_id)
            .field("end_key_doc_id", &self.end_key_doc_id)
            .field("keys", &self.keys)
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .field("descending", &self.descending)
            .field("inclusive_end", &self.inclusive_end)
            .field("include_docs", &self.include_docs)
            .field("content", &self.content)
            .field("group", &self.group)
            .field("group_level", &self.group_level)
            .field("reduce", &self.reduce)
            .field("full_text_query", &self.full_text_query)
            .field("filter", &self.filter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
