//! Regular scan executor
//!
//! Walks the index enumerator in order and emits one row per entry. With
//! `include_docs` set, each row also carries the resolved body of either the
//! emitting document or, when the entry's value names one, a linked document.
//! Resolution failures degrade the row, never the scan.

use serde_json::{Map, Value};

use crate::index::{Entries, ViewIndex};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::storage::{ContentOptions, DocumentStore, SequenceNumber};

use super::errors::{QueryError, QueryResult};
use super::options::QueryOptions;
use super::result::QueryRow;

/// A value shaped `{"_id": "...", "_rev": "..."?}` redirects document
/// resolution to that other document. The `_rev` is optional; absent it
/// means the current revision.
fn linked_ref(value: &Value) -> Option<(&str, Option<&str>)> {
    let map = value.as_object()?;
    let doc_id = map.get("_id")?.as_str()?;
    let rev_id = map.get("_rev").and_then(Value::as_str);
    Some((doc_id, rev_id))
}

/// State of one regular query: the open enumerator plus what each row needs
/// to resolve its document body.
pub(crate) struct RegularScan<'a> {
    entries: Entries<'a>,
    store: &'a dyn DocumentStore,
    include_docs: bool,
    content: ContentOptions,
    view: String,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> RegularScan<'a> {
    pub(crate) fn open(
        view: &str,
        index: Option<&'a dyn ViewIndex>,
        store: &'a dyn DocumentStore,
        options: &QueryOptions,
        metrics: Option<&'a MetricsRegistry>,
    ) -> QueryResult<Self> {
        let index = index.ok_or_else(|| QueryError::NotFound(view.to_string()))?;
        let entries = index
            .enumerate(&options.enumerate_spec())
            .map_err(|err| QueryError::Db(err.to_string()))?;
        Ok(Self {
            entries,
            store,
            include_docs: options.include_docs,
            content: options.content,
            view: view.to_string(),
            metrics,
        })
    }

    /// Resolves the row's document body, following a linked-document value.
    ///
    /// Returns the properties to attach and the sequence to report; only a
    /// linked document substitutes its own sequence for the entry's.
    fn resolve(
        &self,
        entry_doc_id: &str,
        entry_sequence: SequenceNumber,
        value: Option<&Value>,
    ) -> (Option<Map<String, Value>>, SequenceNumber) {
        let (doc_id, rev_id, linked) = match value.and_then(linked_ref) {
            Some((doc_id, rev_id)) => (doc_id, rev_id, true),
            None => (entry_doc_id, None, false),
        };
        match self.store.get_document(doc_id, rev_id, &self.content) {
            Ok(doc) => {
                let sequence = if linked { doc.sequence } else { entry_sequence };
                (Some(doc.properties), sequence)
            }
            Err(err) => {
                log_event(
                    Event::DocReadFailed,
                    &[
                        ("view", &self.view),
                        ("doc", doc_id),
                        ("reason", &err.to_string()),
                    ],
                );
                if let Some(metrics) = self.metrics {
                    metrics.increment_doc_read_failures();
                }
                (None, entry_sequence)
            }
        }
    }

    pub(crate) fn next_row(&mut self) -> Option<QueryRow> {
        let entry = self.entries.next()?;
        let (doc_properties, sequence) = if self.include_docs {
            self.resolve(&entry.doc_id, entry.sequence, entry.value.as_ref())
        } else {
            (None, entry.sequence)
        };
        Some(QueryRow {
            doc_id: Some(entry.doc_id),
            sequence,
            key: entry.key,
            value: entry.value,
            doc_properties,
        })
    }
}
