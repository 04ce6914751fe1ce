//! View handle and query dispatch
//!
//! A [`View`] bundles the collaborators one named view queries against: its
//! index (absent until the host database builds one), the document store,
//! and an optional reduce function. `query` picks the execution shape once,
//! from the options alone, and hands back the lazy producer.

use std::fmt;

use crate::executor::{
    FullTextScan, GroupedScan, PostPass, QueryOptions, QueryResult, QueryRows, RegularScan, Shape,
};
use crate::index::ViewIndex;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::reduce::ReduceFn;
use crate::storage::DocumentStore;

/// One named view's query surface.
///
/// Holds references only; the host database owns the index, the store, and
/// the reduce function, and every query borrows them for its own lifetime.
pub struct View<'a> {
    name: String,
    index: Option<&'a dyn ViewIndex>,
    store: &'a dyn DocumentStore,
    reduce: Option<&'a ReduceFn<'a>>,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> View<'a> {
    /// Creates a view with no index and no reduce function.
    pub fn new(name: impl Into<String>, store: &'a dyn DocumentStore) -> Self {
        Self {
            name: name.into(),
            index: None,
            store,
            reduce: None,
            metrics: None,
        }
    }

    /// Attaches the view's index.
    pub fn with_index(mut self, index: &'a dyn ViewIndex) -> Self {
        self.index = Some(index);
        self
    }

    /// Configures the view's reduce function.
    pub fn with_reduce(mut self, reduce: &'a ReduceFn<'a>) -> Self {
        self.reduce = Some(reduce);
        self
    }

    /// Wires up operational counters.
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The view's name, as used in diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a query with these options would reduce.
    ///
    /// An explicit `reduce` option overrides the view's default; absent one,
    /// reducing is on exactly when the view has a reduce function.
    fn effective_reduce(&self, options: &QueryOptions) -> bool {
        options.reduce.unwrap_or(self.reduce.is_some())
    }

    /// Opens a row producer for one query, or fails before producing
    /// anything.
    ///
    /// Shape selection, first match wins: a non-empty full-text query, then
    /// grouping-or-reduce, then the regular scan. The decision is made here,
    /// once, and the producer never revisits it.
    pub fn query(&self, options: &QueryOptions) -> QueryResult<QueryRows<'a>> {
        let shape = self.select_shape(options);
        match shape {
            Ok(shape) => {
                log_event(
                    Event::QueryOpen,
                    &[("view", &self.name), ("shape", shape.name())],
                );
                if let Some(metrics) = self.metrics {
                    metrics.increment_queries_opened();
                }
                let post = match &shape {
                    // The search collaborator has no paging contract
                    Shape::FullText(_) => PostPass::paged(options.skip, options.limit),
                    _ => match options.filter.clone() {
                        Some(filter) => PostPass::filtered(filter, options.skip, options.limit),
                        None => PostPass::passthrough(),
                    },
                };
                Ok(QueryRows::new(shape, post, self.metrics))
            }
            Err(err) => {
                log_event(
                    Event::QueryRejected,
                    &[("view", &self.name), ("reason", &err.to_string())],
                );
                if let Some(metrics) = self.metrics {
                    metrics.increment_queries_rejected();
                }
                Err(err)
            }
        }
    }

    fn select_shape(&self, options: &QueryOptions) -> QueryResult<Shape<'a>> {
        let full_text = options
            .full_text_query
            .as_deref()
            .filter(|query| !query.is_empty());
        if let Some(query) = full_text {
            let scan = FullTextScan::open(&self.name, self.index, query, self.metrics)?;
            return Ok(Shape::FullText(scan));
        }
        if options.group || options.group_level > 0 || self.effective_reduce(options) {
            let scan =
                GroupedScan::open(&self.name, self.index, self.reduce, options, self.metrics)?;
            return Ok(Shape::Grouped(scan));
        }
        let scan = RegularScan::open(&self.name, self.index, self.store, options, self.metrics)?;
        Ok(Shape::Regular(scan))
    }
}

impl fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("has_index", &self.index.is_some())
            .field("has_reduce", &self.reduce.is_some())
            .finish()
    }
}
