//! Storage engine for Reposit
//!
//! This crate owns everything stateful:
//! - [`Store`]: insertion-ordered record storage, one per entity type
//! - [`Database`]: the registry of entity types, stores and relations
//! - [`Manager`]: per-type creation and query entry points
//! - [`QueryResult`]: the chainable query pipeline
//! - [`RelationResolver`]: reverse lookups across declared references
//!
//! The engine is the only layer that knows how records are held; the
//! predicate algebra below it stays storage-free and reaches back up only
//! through the `RefSource` seam when a path crosses a record reference.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod manager;
pub mod relation;
pub mod result;
pub mod store;

pub use database::{Database, DatabaseConfig};
pub use manager::{IntoAttrs, Manager};
pub use relation::RelationResolver;
pub use result::{DeleteOutcome, QueryResult};
pub use store::Store;
