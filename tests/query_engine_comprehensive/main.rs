//! Query Engine Comprehensive Test Suite
//!
//! End-to-end validation of the full stack through the `reposit` facade:
//! predicate algebra, the query pipeline, cardinality contracts, relations,
//! and transactional rollback, all running against real databases.
//!
//! ## Suite Layout
//!
//! - `predicate_algebra_tests.rs` - lookup verbs, composition, absence
//! - `pipeline_tests.rs` - ordering, distinct, projections, set operations
//! - `cardinality_tests.rs` - get / get_or_create contracts
//! - `relation_tests.rs` - references, reverse accessors, dotted traversal
//! - `transaction_tests.rs` - snapshot rollback in both usage shapes
//! - `concurrent_stress_tests.rs` - shared-database thread safety
//!
//! ## Running
//!
//! ```bash
//! cargo test --test query_engine_comprehensive
//!
//! # One area at a time
//! cargo test --test query_engine_comprehensive pipeline
//! cargo test --test query_engine_comprehensive transaction
//! ```

mod test_utils;

mod cardinality_tests;
mod transaction_tests;

mod concurrent_stress_tests;
