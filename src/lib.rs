//! facetdb - embedded map/reduce view query engine
//!
//! The query-execution core of a document database's view layer: given a
//! view's index, it streams result rows for key-range scans, grouped/reduced
//! aggregation, full-text search, and linked-document expansion. Index
//! construction, document persistence, and tokenization live behind
//! collaborator traits; this crate only reads through them.

pub mod collation;
pub mod executor;
pub mod index;
pub mod observability;
pub mod reduce;
pub mod storage;
pub mod view;

pub use executor::{QueryError, QueryOptions, QueryResult, QueryRow, QueryRows};
pub use view::View;
