//! Observability subsystem for facetdb
//!
//! Structured JSON logging, typed events, and monotonic counters for the
//! query engine. The error-handling design absorbs per-row failures instead
//! of aborting scans; this subsystem is the channel that keeps those
//! absorbed failures visible to operators.
//!
//! # Principles
//!
//! 1. Observability is read-only and never alters query control flow
//! 2. No async, no background threads
//! 3. Deterministic output for identical event sequences

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Logs an event at its own severity.
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    match event.severity() {
        Severity::Trace => Logger::trace(event.as_str(), fields),
        Severity::Info => Logger::info(event.as_str(), fields),
        Severity::Warn => Logger::warn(event.as_str(), fields),
        Severity::Error => Logger::error(event.as_str(), fields),
        Severity::Fatal => Logger::fatal(event.as_str(), fields),
    }
}
