//! Query Executor subsystem for facetdb
//!
//! Turns one [`QueryOptions`] into one lazy [`QueryRows`] producer. The
//! dispatcher in [`crate::view`] picks the execution shape exactly once;
//! everything here runs that shape, one synchronous pull per row.
//!
//! # Execution shapes (first match wins)
//!
//! 1. A full-text query string delegates matching to the search capability
//! 2. Grouping or reducing runs the streaming group-reduce pass
//! 3. Everything else is a plain ordered scan, optionally resolving bodies
//!
//! # Invariants
//!
//! - The shape is immutable for the producer's lifetime
//! - One pull surfaces at most one row; end-of-sequence is final
//! - Per-row failures degrade the row, construction failures abort the query
//! - Dropping the producer releases the enumerator and group buffers

mod errors;
mod fulltext;
mod grouped;
mod options;
mod regular;
mod result;

pub use errors::{QueryError, QueryResult};
pub use grouped::{group_key, group_together};
pub use options::{QueryOptions, RowFilter};
pub use result::{QueryRow, QueryRows};

pub(crate) use fulltext::FullTextScan;
pub(crate) use grouped::GroupedScan;
pub(crate) use regular::RegularScan;
pub(crate) use result::{PostPass, Shape};
