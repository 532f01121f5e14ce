//! Reposit - in-process declarative queries over in-memory records
//!
//! Reposit keeps collections of structured records entirely in memory and
//! queries them declaratively: ActiveRecord-style creation through typed
//! managers, a composable predicate algebra with `path__verb` lookups,
//! chainable result transforms, and snapshot-based transactional mutation.
//!
//! # Quick Start
//!
//! ```
//! use reposit::{Database, EntityType, Predicate, Value};
//!
//! let db = Database::new();
//! let books = db.register(
//!     EntityType::new("Book")
//!         .attribute("title")
//!         .attribute("pages"),
//! )?;
//!
//! books.create([("title", Value::from("Dune")), ("pages", Value::from(412))])?;
//! books.create([("title", Value::from("Messiah")), ("pages", Value::from(256))])?;
//!
//! let long = books.filter(("pages__gte", 300))?;
//! assert_eq!(long.count(), 1);
//!
//! let any = books.filter(Predicate::new("pages__lt", 300) | Predicate::new("title", "Dune"))?;
//! assert_eq!(any.count(), 2);
//! # Ok::<(), reposit::Error>(())
//! ```
//!
//! # Architecture
//!
//! Four layers, re-exported here as one surface:
//!
//! - `reposit-core`: values, records, entity types, path resolution, errors
//! - `reposit-query`: lookup parsing, comparison semantics, predicate trees
//! - `reposit-engine`: stores, the database registry, managers, the query
//!   pipeline, relation resolvers
//! - `reposit-transaction`: snapshot capture and rollback scopes

pub use reposit_core::{
    is_reserved_attribute, AttributeResolver, EntityType, Error, FieldDef, NoRefs, Record,
    RecordId, RecordState, RefSource, Resolution, Result, Timestamp, Value, RESERVED_ATTRIBUTES,
};
pub use reposit_engine::{
    Database, DatabaseConfig, DeleteOutcome, IntoAttrs, Manager, QueryResult, RelationResolver,
    Store,
};
pub use reposit_query::{apply_verb, compare, parse_lookup, IntoPredicate, Predicate, Verb};
pub use reposit_transaction::{transactional, Snapshot, Transaction};
