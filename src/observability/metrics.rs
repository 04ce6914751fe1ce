//! Metrics registry for facetdb
//!
//! Counters only, monotonic, reset on process start. Increments use relaxed
//! atomics so concurrent queries never contend on observability.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use serde_json::Value;

/// Operational counters for the query engine
///
/// # Thread Safety
///
/// All counters use relaxed atomic operations; a snapshot is not a
/// consistent cut across counters, only across time.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Queries whose row producer opened successfully
    queries_opened: AtomicU64,
    /// Queries that failed before producing any row
    queries_rejected: AtomicU64,
    /// Rows handed to callers, all shapes
    rows_emitted: AtomicU64,
    /// Synthetic group rows produced by the grouped shape
    group_rows_emitted: AtomicU64,
    /// Reduce invocations that failed and were absorbed
    reduce_errors: AtomicU64,
    /// Document resolutions that failed and were absorbed
    doc_read_failures: AtomicU64,
    /// Full-text queries dispatched to the search capability
    full_text_queries: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment queries opened
    pub fn increment_queries_opened(&self) {
        self.queries_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment queries rejected
    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment rows emitted
    pub fn increment_rows_emitted(&self) {
        self.rows_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment group rows emitted
    pub fn increment_group_rows(&self) {
        self.group_rows_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment absorbed reduce errors
    pub fn increment_reduce_errors(&self) {
        self.reduce_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment absorbed document read failures
    pub fn increment_doc_read_failures(&self) {
        self.doc_read_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment full-text queries
    pub fn increment_full_text_queries(&self) {
        self.full_text_queries.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_opened: self.queries_opened.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
            group_rows_emitted: self.group_rows_emitted.load(Ordering::Relaxed),
            reduce_errors: self.reduce_errors.load(Ordering::Relaxed),
            doc_read_failures: self.doc_read_failures.load(Ordering::Relaxed),
            full_text_queries: self.full_text_queries.load(Ordering::Relaxed),
        }
    }

    /// Current counter values as a JSON object
    pub fn to_json(&self) -> Value {
        let snapshot = self.snapshot();
        serde_json::json!({
            "queries_opened": snapshot.queries_opened,
            "queries_rejected": snapshot.queries_rejected,
            "rows_emitted": snapshot.rows_emitted,
            "group_rows_emitted": snapshot.group_rows_emitted,
            "reduce_errors": snapshot.reduce_errors,
            "doc_read_failures": snapshot.doc_read_failures,
            "full_text_queries": snapshot.full_text_queries,
        })
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_opened: u64,
    pub queries_rejected: u64,
    pub rows_emitted: u64,
    pub group_rows_emitted: u64,
    pub reduce_errors: u64,
    pub doc_read_failures: u64,
    pub full_text_queries: u64,
}
