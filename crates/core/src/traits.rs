//! Core trait definitions
//!
//! The resolver in this crate needs to follow record references without
//! knowing what owns the records. [`RefSource`] is that seam: it is declared
//! here and implemented by the engine's database, which looks references up
//! in the registered stores.

use crate::record::Record;
use crate::types::RecordId;

/// Lookup surface for dereferencing record references during path resolution
pub trait RefSource {
    /// Resolve a reference to the live target record
    ///
    /// Returns None when the entity type is unknown or the target record has
    /// been deleted; resolution treats both as an absent path segment.
    fn deref_ref(&self, entity: &str, id: RecordId) -> Option<Record>;
}

/// A RefSource with no records; every dereference misses
///
/// Useful for evaluating predicates over detached records, where reference
/// traversal is not meaningful.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefs;

impl RefSource for NoRefs {
    fn deref_ref(&self, _entity: &str, _id: RecordId) -> Option<Record> {
        None
    }
}
