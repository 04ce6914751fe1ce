//! Observability events for facetdb
//!
//! Every operator-visible occurrence in the query engine has a typed event.
//! Absorbed per-row failures (a document that would not load, a reduce
//! function that failed) are surfaced here precisely because they do not
//! alter control flow.

use std::fmt;

use super::logger::Severity;

/// Observable events in the query engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A query was dispatched and its row producer opened
    QueryOpen,
    /// A query failed before producing any row
    QueryRejected,
    /// A reduce function failed; the group row carries a null value
    ReduceFailed,
    /// A document body could not be resolved; the row went out without one
    DocReadFailed,
    /// The full-text collaborator failed to run a match
    FullTextSearchFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::QueryOpen => "QUERY_OPEN",
            Event::QueryRejected => "QUERY_REJECTED",
            Event::ReduceFailed => "REDUCE_FAILED",
            Event::DocReadFailed => "DOC_READ_FAILED",
            Event::FullTextSearchFailed => "FULL_TEXT_SEARCH_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::QueryOpen => Severity::Trace,
            Event::QueryRejected => Severity::Warn,
            Event::ReduceFailed => Severity::Warn,
            Event::DocReadFailed => Severity::Warn,
            Event::FullTextSearchFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::QueryOpen,
            Event::QueryRejected,
            Event::ReduceFailed,
            Event::DocReadFailed,
            Event::FullTextSearchFailed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_absorbed_failures_log_as_warnings() {
        assert_eq!(Event::ReduceFailed.severity(), Severity::Warn);
        assert_eq!(Event::DocReadFailed.severity(), Severity::Warn);
        assert_eq!(Event::QueryOpen.severity(), Severity::Trace);
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::QueryOpen), "QUERY_OPEN");
        assert_eq!(format!("{}", Event::ReduceFailed), "REDUCE_FAILED");
    }
}
