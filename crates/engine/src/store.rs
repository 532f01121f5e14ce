//! Insertion-ordered record store
//!
//! One [`Store`] exists per registered entity type and owns every live
//! record of that type. Records live in a `Vec` in insertion order (the
//! order every query starts from) with an `FxHashMap` identity index
//! alongside for O(1) lookups by [`RecordId`].
//!
//! Both structures sit behind a single `parking_lot::RwLock`, held for the
//! full duration of each operation, so they can never disagree. A record
//! belongs to exactly one store for its lifetime; removal is the only way
//! it stops being visible to queries.

use parking_lot::RwLock;
use reposit_core::{EntityType, Error, Record, RecordId, Result};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

/// All live records of one entity type, in insertion order
pub struct Store {
    entity: Arc<EntityType>,
    inner: RwLock<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    order: Vec<Record>,
    by_id: FxHashMap<RecordId, Record>,
}

impl Store {
    /// Create an empty store for the given entity type
    pub fn new(entity: Arc<EntityType>) -> Self {
        Store {
            entity,
            inner: RwLock::new(StoreInner::default()),
        }
    }

    /// The entity type this store holds
    pub fn entity(&self) -> &Arc<EntityType> {
        &self.entity
    }

    /// Append a record
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if a record with the same identity is already
    /// present. Identities are freshly generated at creation, so this is an
    /// internal consistency fault, not a user-reachable condition.
    pub fn add(&self, record: Record) -> Result<()> {
        let mut inner = self.inner.write();
        if inner.by_id.contains_key(&record.id()) {
            return Err(Error::Corruption(format!(
                "duplicate record identity {} in {} store",
                record.id(),
                self.entity.name()
            )));
        }
        inner.by_id.insert(record.id(), record.clone());
        inner.order.push(record);
        Ok(())
    }

    /// Remove a record by identity, returning it
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if no record with that identity is present.
    pub fn remove(&self, id: RecordId) -> Result<Record> {
        let mut inner = self.inner.write();
        match inner.by_id.remove(&id) {
            Some(record) => {
                inner.order.retain(|r| r.id() != id);
                Ok(record)
            }
            None => Err(Error::Corruption(format!(
                "record {} not present in {} store",
                id,
                self.entity.name()
            ))),
        }
    }

    /// Look up a record by identity
    pub fn by_id(&self, id: RecordId) -> Option<Record> {
        self.inner.read().by_id.get(&id).cloned()
    }

    /// Whether a record with this identity is present
    pub fn contains(&self, id: RecordId) -> bool {
        self.inner.read().by_id.contains_key(&id)
    }

    /// All live records in insertion order
    ///
    /// The returned handles share state with the stored records; the `Vec`
    /// itself is an independent snapshot that later store mutations do not
    /// touch.
    pub fn snapshot(&self) -> Vec<Record> {
        self.inner.read().order.clone()
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("entity", &self.entity.name())
            .field("len", &self.len())
            .finish()
    }
}
