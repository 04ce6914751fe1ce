//! Full-text executor
//!
//! Delegates conjunctive word matching to the index's search capability and
//! emits one row per matched document, in the collaborator's own order. No
//! document resolution happens here; a search failure aborts construction
//! outright rather than producing partial results.

use serde_json::Value;

use crate::index::{DocIds, IndexKind, ViewIndex};
use crate::observability::{log_event, Event, MetricsRegistry};

use super::errors::{QueryError, QueryResult};
use super::result::QueryRow;

/// State of one full-text query: the match cursor and the search string
/// every row reports as its key.
pub(crate) struct FullTextScan<'a> {
    matches: DocIds<'a>,
    query: String,
}

impl<'a> FullTextScan<'a> {
    pub(crate) fn open(
        view: &str,
        index: Option<&'a dyn ViewIndex>,
        query: &str,
        metrics: Option<&'a MetricsRegistry>,
    ) -> QueryResult<Self> {
        let index = index.ok_or_else(|| QueryError::NotFound(view.to_string()))?;
        if index.kind() != IndexKind::FullText {
            return Err(QueryError::BadRequest(format!(
                "view {} is not full-text indexed",
                view
            )));
        }
        let search = index.full_text().ok_or_else(|| {
            QueryError::BadRequest(format!("view {} offers no search capability", view))
        })?;

        if let Some(metrics) = metrics {
            metrics.increment_full_text_queries();
        }
        let matches = search.docs_containing_words(query, true).map_err(|err| {
            log_event(
                Event::FullTextSearchFailed,
                &[("view", view), ("reason", &err.to_string())],
            );
            QueryError::Db(err.to_string())
        })?;
        Ok(Self {
            matches,
            query: query.to_string(),
        })
    }

    pub(crate) fn next_row(&mut self) -> Option<QueryRow> {
        let doc_id = self.matches.next()?;
        Some(QueryRow {
            doc_id: Some(doc_id),
            sequence: 0,
            key: Value::String(self.query.clone()),
            value: None,
            doc_properties: None,
        })
    }
}
