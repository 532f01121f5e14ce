//! Record handles and attribute state
//!
//! A [`Record`] is a cheap-clone handle to one stored entity instance. The
//! identity and entity type are immutable; the attribute state lives behind
//! a `parking_lot::RwLock` so that mutation, snapshot and restore are each
//! atomic with respect to readers.
//!
//! Records are normally created through a manager, which assigns the
//! identity and timestamps and inserts the record into its store.
//! `Record::new` is exposed for lower layers and tests that work on
//! detached records.

use crate::entity::{is_reserved_attribute, EntityType};
use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use crate::types::RecordId;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The mutable state of a record: attributes plus metadata timestamps
///
/// Cloning a RecordState yields a fully independent deep copy; `Value` holds
/// no shared interior. Transactions rely on this to capture and restore
/// whole states atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordState {
    /// Attribute map, ordered by name
    pub attrs: BTreeMap<String, Value>,
    /// When the record was inserted into its store
    pub created: Timestamp,
    /// When the record was last mutated (equals `created` unless the owning
    /// database opts into refresh-on-write)
    pub updated: Timestamp,
}

struct RecordInner {
    id: RecordId,
    entity: Arc<EntityType>,
    refresh_updated: bool,
    state: RwLock<RecordState>,
}

/// Cheap-clone handle to one stored entity instance
///
/// All clones observe the same attribute state; queries hold clones of the
/// handles in a store, so attribute mutations made through any handle are
/// visible everywhere. Equality is identity equality.
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

impl Record {
    /// Create a detached record with a fresh identity
    ///
    /// `created` and `updated` are both set to the current moment. When
    /// `refresh_updated` is true, each later `set` refreshes `updated`.
    pub fn new(
        entity: Arc<EntityType>,
        attrs: BTreeMap<String, Value>,
        refresh_updated: bool,
    ) -> Self {
        let now = Timestamp::now();
        Record {
            inner: Arc::new(RecordInner {
                id: RecordId::new(),
                entity,
                refresh_updated,
                state: RwLock::new(RecordState {
                    attrs,
                    created: now,
                    updated: now,
                }),
            }),
        }
    }

    /// The record's identity
    pub fn id(&self) -> RecordId {
        self.inner.id
    }

    /// The record's entity type
    pub fn entity(&self) -> &Arc<EntityType> {
        &self.inner.entity
    }

    /// The record's entity type name
    pub fn entity_name(&self) -> &str {
        self.inner.entity.name()
    }

    /// When the record was inserted
    pub fn created(&self) -> Timestamp {
        self.inner.state.read().created
    }

    /// When the record was last mutated
    pub fn updated(&self) -> Timestamp {
        self.inner.state.read().updated
    }

    /// Read one attribute by name
    ///
    /// Reserved names are not attributes; use [`Record::field`] to resolve
    /// them alongside user attributes.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.inner.state.read().attrs.get(name).cloned()
    }

    /// Resolve a single field name: `id`, `created`, `updated`, or an attribute
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id())),
            "created" => Some(Value::from(self.created())),
            "updated" => Some(Value::from(self.updated())),
            _ => self.get(name),
        }
    }

    /// Write one attribute
    ///
    /// The attribute set is open after creation: names beyond the declared
    /// fields are accepted. Reserved names are rejected.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        if is_reserved_attribute(name) {
            return Err(Error::ReservedAttribute {
                attribute: name.to_string(),
            });
        }

        let mut state = self.inner.state.write();
        state.attrs.insert(name.to_string(), value.into());
        if self.inner.refresh_updated {
            state.updated = Timestamp::now();
        }
        Ok(())
    }

    /// Point a reference attribute at another record
    pub fn set_ref(&self, name: &str, target: &Record) -> Result<()> {
        self.set(name, Value::from(target))
    }

    /// Names of all attributes currently present, in sorted order
    pub fn attr_names(&self) -> Vec<String> {
        self.inner.state.read().attrs.keys().cloned().collect()
    }

    /// A point-in-time copy of the attribute map
    pub fn attrs(&self) -> BTreeMap<String, Value> {
        self.inner.state.read().attrs.clone()
    }

    /// A deep, independent copy of the full record state
    pub fn state_snapshot(&self) -> RecordState {
        self.inner.state.read().clone()
    }

    /// Replace the full record state atomically
    pub fn restore_state(&self, state: RecordState) {
        *self.inner.state.write() = state;
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    // Shallow on purpose; reading attrs would take the state lock
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("id", &self.inner.id)
            .field("entity", &self.inner.entity.name())
            .finish_non_exhaustive()
    }
}

impl From<&Record> for Value {
    /// The reference value carrying this record's identity
    fn from(record: &Record) -> Self {
        Value::Ref {
            entity: record.entity_name().to_string(),
            id: record.id(),
        }
    }
}
