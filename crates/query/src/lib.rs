//! Predicate algebra for Reposit
//!
//! This crate turns lookup specifications like `"author.name__istartswith"`
//! into evaluatable predicate trees. It is deliberately storage-free: a
//! [`Predicate`] only needs a [`Record`](reposit_core::Record) and a
//! [`RefSource`](reposit_core::RefSource) to evaluate, so the whole algebra
//! is testable without a database.
//!
//! ## Layers
//!
//! - [`lookup`]: splits a spec into a dotted path and a [`Verb`]
//! - [`compare`]: value ordering and per-verb comparison semantics
//! - [`predicate`]: the composable [`Predicate`] tree and conversions
//!
//! ## Example
//!
//! ```
//! use reposit_query::Predicate;
//!
//! let p = Predicate::new("pages__gte", 100) & !Predicate::new("lang", "fr");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod lookup;
pub mod predicate;

pub use compare::{apply_verb, compare};
pub use lookup::{parse_lookup, Verb};
pub use predicate::{IntoPredicate, Predicate};
