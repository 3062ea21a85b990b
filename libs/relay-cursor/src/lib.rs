#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Relay-style keyset pagination.
//!
//! Given a total [`SortSpec`] and [`ConnectionArgs`] (`first` / `last` /
//! `after` / `before`), [`PaginationEngine`] turns opaque cursors into seek
//! predicates, fetches one page through an [`OrderedQueryExecutor`] and
//! answers `hasNextPage` / `hasPreviousPage` with bounded probes instead of
//! full counts.
//!
//! Storage backends plug in by implementing [`OrderedQueryExecutor`];
//! [`memory::InMemoryExecutor`] is the reference implementation.

pub mod args;
pub mod config;
pub mod cursor;
pub mod engine;
pub mod errors;
pub mod executor;
pub mod memory;
pub mod order;
pub mod page;
pub mod predicate;
pub mod stream;
pub mod value;

pub use args::ConnectionArgs;
pub use config::PaginationConfig;
pub use cursor::CursorKey;
pub use engine::{EngineBuilder, PaginationEngine, Probe, QueryPlan};
pub use errors::{CursorError, Error};
pub use executor::{FieldLookup, KeyExtractor, OrderedQueryExecutor, Record};
pub use order::{SortDir, SortField, SortSpec};
pub use page::{Connection, Edge, PageInfo};
pub use predicate::{seek, CompareOp, Comparison, Predicate, Seek};
pub use value::{Value, ValueKind};
