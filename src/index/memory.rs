//! In-memory index implementations
//!
//! [`MemoryViewIndex`] keeps entries in one sorted vector and serves range
//! and key-probe cursors by binary searching bounds, so enumeration clones
//! entries lazily as the cursor advances. [`MemoryFullTextIndex`] keeps a
//! word-to-documents posting map with a naive alphanumeric tokenizer.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use crate::collation::collate;

use super::errors::{IndexError, IndexResult};
use super::{DocIds, Entries, EnumerateSpec, FullTextSearch, IndexEntry, IndexKind, ViewIndex};

/// Compares an entry against a bound, by key then optionally by document ID.
fn against_bound(entry: &IndexEntry, key: &Value, doc_id: Option<&str>) -> Ordering {
    match collate(&entry.key, key) {
        Ordering::Equal => match doc_id {
            Some(doc_id) => entry.doc_id.as_str().cmp(doc_id),
            None => Ordering::Equal,
        },
        unequal => unequal,
    }
}

/// Sorted-vector index over emitted (key, value, docID, sequence) entries.
#[derive(Debug, Default)]
pub struct MemoryViewIndex {
    /// Sorted by collated key, then document ID
    entries: Vec<IndexEntry>,
}

impl MemoryViewIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry at its collation position.
    ///
    /// Entries with equal key and document ID keep insertion order.
    pub fn insert(&mut self, entry: IndexEntry) {
        let pos = self
            .entries
            .partition_point(|e| match collate(&e.key, &entry.key) {
                Ordering::Less => true,
                Ordering::Equal => e.doc_id <= entry.doc_id,
                Ordering::Greater => false,
            });
        self.entries.insert(pos, entry);
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the index holds no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contiguous run of entries whose key collates equal to `key`.
    fn key_run(&self, key: &Value) -> (usize, usize) {
        let start = self
            .entries
            .partition_point(|e| collate(&e.key, key) == Ordering::Less);
        let end = self
            .entries
            .partition_point(|e| collate(&e.key, key) != Ordering::Greater);
        (start, end)
    }

    /// Resolves range bounds to stored-order positions.
    ///
    /// The start bound is always inclusive; only the end bound honors
    /// `inclusive_end`. Descending swaps which caller bound sits at the low
    /// end of the stored order.
    fn range_bounds(&self, spec: &EnumerateSpec) -> (usize, usize) {
        let (low_key, low_doc, low_inclusive, high_key, high_doc, high_inclusive) =
            if spec.descending {
                (
                    spec.end_key.as_ref(),
                    spec.end_doc_id.as_deref(),
                    spec.inclusive_end,
                    spec.start_key.as_ref(),
                    spec.start_doc_id.as_deref(),
                    true,
                )
            } else {
                (
                    spec.start_key.as_ref(),
                    spec.start_doc_id.as_deref(),
                    true,
                    spec.end_key.as_ref(),
                    spec.end_doc_id.as_deref(),
                    spec.inclusive_end,
                )
            };

        let from = match low_key {
            None => 0,
            Some(key) if low_inclusive => self
                .entries
                .partition_point(|e| against_bound(e, key, low_doc) == Ordering::Less),
            Some(key) => self
                .entries
                .partition_point(|e| against_bound(e, key, low_doc) != Ordering::Greater),
        };
        let to = match high_key {
            None => self.entries.len(),
            Some(key) if high_inclusive => self
                .entries
                .partition_point(|e| against_bound(e, key, high_doc) != Ordering::Greater),
            Some(key) => self
                .entries
                .partition_point(|e| against_bound(e, key, high_doc) == Ordering::Less),
        };
        (from, to.max(from))
    }
}

impl ViewIndex for MemoryViewIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Value
    }

    fn enumerate<'a>(&'a self, spec: &EnumerateSpec) -> IndexResult<Entries<'a>> {
        let limit = spec.limit.unwrap_or(usize::MAX);

        if let Some(keys) = &spec.keys {
            // Probe runs in caller order; descending reverses the probe
            // order and each run.
            let mut runs: Vec<(usize, usize)> = keys.iter().map(|key| self.key_run(key)).collect();
            if spec.descending {
                runs.reverse();
            }
            let entries = self.entries.as_slice();
            let descending = spec.descending;
            let rows = runs.into_iter().flat_map(move |(start, end)| {
                let run = entries[start..end].iter().cloned();
                if descending {
                    Box::new(run.rev()) as Box<dyn Iterator<Item = IndexEntry> + 'a>
                } else {
                    Box::new(run) as Box<dyn Iterator<Item = IndexEntry> + 'a>
                }
            });
            return Ok(Box::new(rows.skip(spec.skip).take(limit)));
        }

        let (from, to) = self.range_bounds(spec);
        let rows = self.entries[from..to].iter().cloned();
        if spec.descending {
            Ok(Box::new(rows.rev().skip(spec.skip).take(limit)))
        } else {
            Ok(Box::new(rows.skip(spec.skip).take(limit)))
        }
    }
}

/// Lowercased alphanumeric words of `text`
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| word.to_lowercase())
}

/// Posting-map full-text index.
///
/// Matches are returned in document-ID order.
#[derive(Debug, Default)]
pub struct MemoryFullTextIndex {
    postings: BTreeMap<String, BTreeSet<String>>,
    broken: Option<String>,
}

impl MemoryFullTextIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a document's text to the postings
    pub fn index_text(&mut self, doc_id: &str, text: &str) {
        for word in tokenize(text) {
            self.postings
                .entry(word)
                .or_default()
                .insert(doc_id.to_string());
        }
    }

    /// Makes every search fail with `SearchFailed`
    pub fn break_searches(&mut self, reason: &str) {
        self.broken = Some(reason.to_string());
    }
}

impl ViewIndex for MemoryFullTextIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::FullText
    }

    fn enumerate(&self, _spec: &EnumerateSpec) -> IndexResult<Entries<'_>> {
        // A full-text index has no ordered key entries to walk
        Ok(Box::new(std::iter::empty()))
    }

    fn full_text(&self) -> Option<&dyn FullTextSearch> {
        Some(self)
    }
}

impl FullTextSearch for MemoryFullTextIndex {
    fn docs_containing_words(&self, query: &str, match_all: bool) -> IndexResult<DocIds<'_>> {
        if let Some(reason) = &self.broken {
            return Err(IndexError::SearchFailed(reason.clone()));
        }
        let mut matched: Option<BTreeSet<String>> = None;
        for word in tokenize(query) {
            let docs = self.postings.get(&word).cloned().unwrap_or_default();
            matched = Some(match matched {
                None => docs,
                Some(acc) if match_all => acc.intersection(&docs).cloned().collect(),
                Some(acc) => acc.union(&docs).cloned().collect(),
            });
        }
        Ok(Box::new(matched.unwrap_or_default().into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(key: Value, doc_id: &str) -> IndexEntry {
        IndexEntry::new(key, None, doc_id, 0)
    }

    fn keys_of(entries: Entries<'_>) -> Vec<(Value, String)> {
        entries.map(|e| (e.key, e.doc_id)).collect()
    }

    fn sample_index() -> MemoryViewIndex {
        let mut index = MemoryViewIndex::new();
        // Inserted out of order on purpose
        index.insert(entry(json!("c"), "d4"));
        index.insert(entry(json!("b"), "d3"));
        index.insert(entry(json!("a"), "d1"));
        index.insert(entry(json!("b"), "d2"));
        index
    }

    #[test]
    fn test_entries_sorted_by_key_then_doc_id() {
        let index = sample_index();
        let rows = keys_of(index.enumerate(&EnumerateSpec::default()).unwrap());
        assert_eq!(
            rows,
            vec![
                (json!("a"), "d1".to_string()),
                (json!("b"), "d2".to_string()),
                (json!("b"), "d3".to_string()),
                (json!("c"), "d4".to_string()),
            ]
        );
    }

    #[test]
    fn test_range_inclusive_and_exclusive_end() {
        let index = sample_index();

        let spec = EnumerateSpec {
            start_key: Some(json!("b")),
            end_key: Some(json!("c")),
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(rows.len(), 3);

        let spec = EnumerateSpec {
            start_key: Some(json!("b")),
            end_key: Some(json!("c")),
            inclusive_end: false,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!("b"), "d2".to_string()), (json!("b"), "d3".to_string())]
        );
    }

    #[test]
    fn test_doc_id_bounds_disambiguate_duplicate_keys() {
        let index = sample_index();

        let spec = EnumerateSpec {
            start_key: Some(json!("b")),
            start_doc_id: Some("d3".to_string()),
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!("b"), "d3".to_string()), (json!("c"), "d4".to_string())]
        );

        let spec = EnumerateSpec {
            end_key: Some(json!("b")),
            end_doc_id: Some("d3".to_string()),
            inclusive_end: false,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!("a"), "d1".to_string()), (json!("b"), "d2".to_string())]
        );
    }

    #[test]
    fn test_descending_swaps_bound_roles() {
        let index = sample_index();

        let spec = EnumerateSpec {
            start_key: Some(json!("c")),
            end_key: Some(json!("b")),
            descending: true,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![
                (json!("c"), "d4".to_string()),
                (json!("b"), "d3".to_string()),
                (json!("b"), "d2".to_string()),
            ]
        );

        // Exclusive end now trims the low side
        let spec = EnumerateSpec {
            start_key: Some(json!("c")),
            end_key: Some(json!("b")),
            descending: true,
            inclusive_end: false,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(rows, vec![(json!("c"), "d4".to_string())]);
    }

    #[test]
    fn test_keys_probe_in_caller_order() {
        let index = sample_index();

        let spec = EnumerateSpec {
            keys: Some(vec![json!("c"), json!("a"), json!("missing")]),
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!("c"), "d4".to_string()), (json!("a"), "d1".to_string())]
        );

        let spec = EnumerateSpec {
            keys: Some(vec![json!("a"), json!("b")]),
            descending: true,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![
                (json!("b"), "d3".to_string()),
                (json!("b"), "d2".to_string()),
                (json!("a"), "d1".to_string()),
            ]
        );
    }

    #[test]
    fn test_skip_and_limit_apply_in_iteration_order() {
        let index = sample_index();

        let spec = EnumerateSpec {
            skip: 1,
            limit: Some(2),
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!("b"), "d2".to_string()), (json!("b"), "d3".to_string())]
        );

        let spec = EnumerateSpec {
            skip: 1,
            limit: Some(2),
            descending: true,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!("b"), "d3".to_string()), (json!("b"), "d2".to_string())]
        );
    }

    #[test]
    fn test_inverted_range_yields_nothing() {
        let index = sample_index();
        let spec = EnumerateSpec {
            start_key: Some(json!("c")),
            end_key: Some(json!("a")),
            ..EnumerateSpec::default()
        };
        assert_eq!(index.enumerate(&spec).unwrap().count(), 0);
    }

    #[test]
    fn test_collated_cross_type_range() {
        let mut index = MemoryViewIndex::new();
        index.insert(entry(json!(null), "d1"));
        index.insert(entry(json!(7), "d2"));
        index.insert(entry(json!("x"), "d3"));
        index.insert(entry(json!([1, 2]), "d4"));

        // Numbers sort before strings, strings before arrays
        let spec = EnumerateSpec {
            start_key: Some(json!(0)),
            end_key: Some(json!([])),
            inclusive_end: false,
            ..EnumerateSpec::default()
        };
        let rows = keys_of(index.enumerate(&spec).unwrap());
        assert_eq!(
            rows,
            vec![(json!(7), "d2".to_string()), (json!("x"), "d3".to_string())]
        );
    }

    // ==========================================================
    // Full-text
    // ==========================================================

    fn sample_full_text() -> MemoryFullTextIndex {
        let mut index = MemoryFullTextIndex::new();
        index.index_text("doc-1", "The quick brown fox");
        index.index_text("doc-2", "Quick thinking, slow walking");
        index.index_text("doc-3", "A brown paper bag");
        index
    }

    #[test]
    fn test_full_text_conjunctive_match() {
        let index = sample_full_text();
        let docs: Vec<String> = index
            .docs_containing_words("quick brown", true)
            .unwrap()
            .collect();
        assert_eq!(docs, vec!["doc-1".to_string()]);
    }

    #[test]
    fn test_full_text_any_word_match() {
        let index = sample_full_text();
        let docs: Vec<String> = index
            .docs_containing_words("quick brown", false)
            .unwrap()
            .collect();
        assert_eq!(
            docs,
            vec!["doc-1".to_string(), "doc-2".to_string(), "doc-3".to_string()]
        );
    }

    #[test]
    fn test_full_text_is_case_insensitive() {
        let index = sample_full_text();
        let docs: Vec<String> = index
            .docs_containing_words("QUICK", true)
            .unwrap()
            .collect();
        assert_eq!(docs, vec!["doc-1".to_string(), "doc-2".to_string()]);
    }

    #[test]
    fn test_full_text_failure_reported() {
        let mut index = sample_full_text();
        index.break_searches("postings lost");
        let err = index.docs_containing_words("quick", true).err().unwrap();
        assert!(matches!(err, IndexError::SearchFailed(_)));
    }

    #[test]
    fn test_full_text_index_has_no_key_entries() {
        let index = sample_full_text();
        assert_eq!(index.kind(), IndexKind::FullText);
        assert_eq!(index.enumerate(&EnumerateSpec::default()).unwrap().count(), 0);
        assert!(index.full_text().is_some());
    }
}
