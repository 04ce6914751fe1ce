//! Grouped/reduce executor
//!
//! The core algorithm of the engine: a single pass over the sorted
//! enumeration that detects group boundaries as they stream by, buffers one
//! group's keys and values at a time, and emits one synthetic row per group
//! holding the reduce function's output. Without grouping the whole range is
//! one group; without a reduce function the rows report keys only.
//!
//! Grouping compares parsed keys structurally, not by collated bytes; see
//! the collation module for where the two orders can disagree.

use serde_json::Value;

use crate::index::{Entries, ViewIndex};
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::reduce::ReduceFn;

use super::errors::{QueryError, QueryResult};
use super::options::QueryOptions;
use super::result::QueryRow;

/// Whether two keys aggregate into the same group at `level`.
///
/// Level 0 groups by the whole key. A non-array key can only group at level
/// 1, by equality. Array keys compare element-wise over the first
/// `min(level, len(k1), len(k2))` positions, so keys shorter than the level
/// still group together when their shared prefix matches.
pub fn group_together(k1: &Value, k2: &Value, level: u32) -> bool {
    if level == 0 {
        return k1 == k2;
    }
    match (k1.as_array(), k2.as_array()) {
        (Some(a1), Some(a2)) => {
            let shared = (level as usize).min(a1.len()).min(a2.len());
            a1[..shared] == a2[..shared]
        }
        _ => level == 1 && k1 == k2,
    }
}

/// The key reported for a group: the length-`level` prefix of an array key,
/// or the whole key when it is not an array, is shorter than the level, or
/// the level is 0.
pub fn group_key(key: &Value, level: u32) -> Value {
    match key.as_array() {
        Some(items) if level > 0 => {
            Value::Array(items.iter().take(level as usize).cloned().collect())
        }
        _ => key.clone(),
    }
}

/// State of one grouped query: the open enumerator, the pending group's
/// buffers, and the boundary-detection key.
pub(crate) struct GroupedScan<'a> {
    entries: Entries<'a>,
    reduce: Option<&'a ReduceFn<'a>>,
    grouped: bool,
    group_level: u32,
    last_key: Option<Value>,
    keys_to_reduce: Vec<Value>,
    values_to_reduce: Vec<Value>,
    view: String,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> GroupedScan<'a> {
    pub(crate) fn open(
        view: &str,
        index: Option<&'a dyn ViewIndex>,
        reduce: Option<&'a ReduceFn<'a>>,
        options: &QueryOptions,
        metrics: Option<&'a MetricsRegistry>,
    ) -> QueryResult<Self> {
        // An explicit reduce=true with nothing to run it is caller error,
        // caught before any resource is opened.
        if options.reduce == Some(true) && reduce.is_none() {
            return Err(QueryError::BadParam(format!(
                "reduce requested but view {} has no reduce function",
                view
            )));
        }
        let index = index.ok_or_else(|| QueryError::NotFound(view.to_string()))?;
        let entries = index
            .enumerate(&options.enumerate_spec())
            .map_err(|err| QueryError::Db(err.to_string()))?;

        let reducing = options.reduce.unwrap_or(reduce.is_some());
        Ok(Self {
            entries,
            reduce: if reducing { reduce } else { None },
            grouped: options.group || options.group_level > 0,
            group_level: options.group_level,
            last_key: None,
            keys_to_reduce: Vec::new(),
            values_to_reduce: Vec::new(),
            view: view.to_string(),
            metrics,
        })
    }

    /// Runs the reduce function over the buffered group.
    ///
    /// A reduce failure is absorbed: the group's value becomes JSON null and
    /// the failure goes to the log, never up the stack.
    fn run_reduce(&self, reduce: &ReduceFn<'_>) -> Value {
        match reduce(&self.keys_to_reduce, &self.values_to_reduce, false) {
            Ok(value) => value,
            Err(err) => {
                log_event(
                    Event::ReduceFailed,
                    &[("view", &self.view), ("reason", &err.to_string())],
                );
                if let Some(metrics) = self.metrics {
                    metrics.increment_reduce_errors();
                }
                Value::Null
            }
        }
    }

    /// Emits the pending group as a synthetic row and clears the buffers.
    fn flush(&mut self, last_key: &Value) -> QueryRow {
        let key = if self.grouped {
            group_key(last_key, self.group_level)
        } else {
            Value::Null
        };
        let value = self.reduce.map(|reduce| self.run_reduce(reduce));
        self.keys_to_reduce.clear();
        self.values_to_reduce.clear();
        if let Some(metrics) = self.metrics {
            metrics.increment_group_rows();
        }
        QueryRow {
            doc_id: None,
            sequence: 0,
            key,
            value,
            doc_properties: None,
        }
    }

    pub(crate) fn next_row(&mut self) -> Option<QueryRow> {
        loop {
            let entry = self.entries.next();

            // A boundary is crossed when the stream ends with a pending
            // group, or when grouping is on and the new key belongs to a
            // different group than the pending one.
            let boundary = match (&self.last_key, &entry) {
                (Some(_), None) => true,
                (Some(last), Some(next)) => {
                    self.grouped && !group_together(&next.key, last, self.group_level)
                }
                (None, _) => false,
            };
            let flushed = if boundary {
                let last = self.last_key.take();
                Some(self.flush(last.as_ref().unwrap()))
            } else {
                None
            };

            match entry {
                Some(entry) => {
                    if self.reduce.is_some() {
                        self.keys_to_reduce.push(entry.key.clone());
                        self.values_to_reduce.push(entry.value.unwrap_or(Value::Null));
                    }
                    self.last_key = Some(entry.key);
                    if let Some(row) = flushed {
                        return Some(row);
                    }
                }
                None => {
                    self.last_key = None;
                    return flushed;
                }
            }
        }
    }
}
