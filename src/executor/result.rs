//! Result rows and the streaming producer
//!
//! [`QueryRows`] is the one thing a query hands back: a pull-based producer
//! that surfaces one row per `next` call, fully synchronously, until the
//! underlying enumeration is exhausted. It owns the state of exactly one
//! execution shape, chosen at construction and never revisited, plus the
//! post pass that re-applies filter/skip/limit when the enumerator could
//! not. Dropping it releases the enumerator and any group buffers.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::observability::MetricsRegistry;
use crate::storage::SequenceNumber;

use super::fulltext::FullTextScan;
use super::grouped::GroupedScan;
use super::options::RowFilter;
use super::regular::RegularScan;

/// One result unit.
///
/// Ownership passes entirely to the caller; the producer retains nothing of
/// a row once it is returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRow {
    /// Emitting document, or `None` for synthetic group rows
    pub doc_id: Option<String>,
    /// Revision counter of the row's document; 0 for synthetic rows
    pub sequence: SequenceNumber,
    /// Index key, group prefix, or the search string
    pub key: Value,
    /// Index value or reduce output
    pub value: Option<Value>,
    /// Resolved document body, when requested and resolvable
    pub doc_properties: Option<Map<String, Value>>,
}

/// The execution shape chosen by the dispatcher, resolved once.
pub(crate) enum Shape<'a> {
    Regular(RegularScan<'a>),
    Grouped(GroupedScan<'a>),
    FullText(FullTextScan<'a>),
}

impl Shape<'_> {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Shape::Regular(_) => "regular",
            Shape::Grouped(_) => "grouped",
            Shape::FullText(_) => "full_text",
        }
    }
}

/// Filter/skip/limit applied to produced rows.
///
/// Inactive when the enumerator already did the paging; active for the
/// full-text shape (whose collaborator has no paging contract) and whenever
/// a row filter forces paging to count filtered rows.
pub(crate) struct PostPass {
    filter: Option<Arc<RowFilter>>,
    skip: usize,
    remaining: Option<usize>,
    active: bool,
}

impl PostPass {
    /// The enumerator already applied skip/limit; pass rows through.
    pub(crate) fn passthrough() -> Self {
        Self {
            filter: None,
            skip: 0,
            remaining: None,
            active: false,
        }
    }

    /// Apply skip/limit here, no filter.
    pub(crate) fn paged(skip: usize, limit: Option<usize>) -> Self {
        Self {
            filter: None,
            skip,
            remaining: limit,
            active: true,
        }
    }

    /// Apply the filter, then skip/limit over the rows that pass it.
    pub(crate) fn filtered(filter: Arc<RowFilter>, skip: usize, limit: Option<usize>) -> Self {
        Self {
            filter: Some(filter),
            skip,
            remaining: limit,
            active: true,
        }
    }

    fn exhausted(&self) -> bool {
        self.active && self.remaining == Some(0)
    }

    /// Whether this row reaches the caller; consumes skip/limit budget.
    fn admit(&mut self, row: &QueryRow) -> bool {
        if !self.active {
            return true;
        }
        if let Some(filter) = &self.filter {
            if !filter(row) {
                return false;
            }
        }
        if self.skip > 0 {
            self.skip -= 1;
            return false;
        }
        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
        true
    }
}

/// Lazy row producer for one query.
///
/// Pulling past exhaustion keeps returning `None`.
pub struct QueryRows<'a> {
    shape: Shape<'a>,
    post: PostPass,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> QueryRows<'a> {
    pub(crate) fn new(
        shape: Shape<'a>,
        post: PostPass,
        metrics: Option<&'a MetricsRegistry>,
    ) -> Self {
        Self {
            shape,
            post,
            metrics,
        }
    }

    /// Name of the execution shape this producer runs
    pub fn shape(&self) -> &'static str {
        self.shape.name()
    }
}

impl std::fmt::Debug for QueryRows<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryRows")
            .field("shape", &self.shape.name())
            .finish_non_exhaustive()
    }
}

impl Iterator for QueryRows<'_> {
    type Item = QueryRow;

    fn next(&mut self) -> Option<QueryRow> {
        loop {
            if self.post.exhausted() {
                return None;
            }
            let row = match &mut self.shape {
                Shape::Regular(scan) => scan.next_row(),
                Shape::Grouped(scan) => scan.next_row(),
                Shape::FullText(scan) => scan.next_row(),
            }?;
            if !self.post.admit(&row) {
                continue;
            }
            if let Some(metrics) = self.metrics {
                metrics.increment_rows_emitted();
            }
            return Some(row);
        }
    }
}
