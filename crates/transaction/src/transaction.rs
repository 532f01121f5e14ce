//! All-or-nothing mutation scopes
//!
//! Two shapes over one mechanism:
//!
//! 1. **Closure form** (recommended): [`transactional`] captures a
//!    [`Snapshot`], runs the closure, and on `Err` restores the record
//!    before handing the error back unchanged.
//! 2. **Manual guard**: [`Transaction`] for call sites that need external
//!    control over when the scope opens and closes.
//!
//! Scopes nest freely on the same record: each owns an independent
//! snapshot, an inner failure restores the inner state and propagates, and
//! the enclosing scope then restores its own.

use crate::snapshot::Snapshot;
use reposit_core::{Error, Record, Result};
use tracing::debug;

/// Run `f` against the record, rolling back every mutation on failure
///
/// On success the closure's value passes through untouched. On failure the
/// record's full state (attributes and timestamps) is restored to what it
/// was when the scope opened, and the closure's error is returned
/// unchanged.
///
/// # Example
///
/// ```
/// use reposit_core::{EntityType, Error, Record, Value};
/// use reposit_transaction::transactional;
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
///
/// let entity = Arc::new(EntityType::new("Counter").attribute("value"));
/// let mut attrs = BTreeMap::new();
/// attrs.insert("value".to_string(), Value::Int(-1));
/// let counter = Record::new(entity, attrs, false);
///
/// let outcome: Result<(), Error> = transactional(&counter, |r| {
///     r.set("value", "1111")?;
///     Err(Error::InvalidOperation("increment of a string".into()))
/// });
///
/// assert!(outcome.is_err());
/// assert_eq!(counter.get("value"), Some(Value::Int(-1)));
/// ```
pub fn transactional<T, F>(record: &Record, f: F) -> Result<T>
where
    F: FnOnce(&Record) -> Result<T>,
{
    let snapshot = Snapshot::capture(record);
    match f(record) {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!(
                entity = %record.entity_name(),
                id = %record.id(),
                "rolling back after failed transactional scope"
            );
            snapshot.restore(record).and(Err(e))
        }
    }
}

/// Manual transaction guard over one record
///
/// Binds to the record without capturing; [`begin`](Transaction::begin)
/// opens the scope. Dropping the guard with an open scope discards the
/// snapshot, which commits by default; call
/// [`rollback`](Transaction::rollback) to restore instead.
pub struct Transaction<'a> {
    record: &'a Record,
    snapshot: Option<Snapshot>,
}

impl<'a> Transaction<'a> {
    /// Bind to a record without capturing anything
    pub fn new(record: &'a Record) -> Self {
        Transaction {
            record,
            snapshot: None,
        }
    }

    /// The record this guard is bound to
    pub fn record(&self) -> &Record {
        self.record
    }

    /// Whether a snapshot is currently held
    pub fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Capture the record's state, opening the scope
    ///
    /// Calling `begin` with a scope already open replaces the held
    /// snapshot with a fresh capture.
    pub fn begin(&mut self) {
        self.snapshot = Some(Snapshot::capture(self.record));
    }

    /// Discard the held snapshot, keeping all mutations
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    /// Restore the record to the captured state
    ///
    /// # Errors
    ///
    /// `CorruptTransaction` when no snapshot is held: either `begin` was
    /// never called, or the snapshot was already consumed by a commit or
    /// an earlier rollback.
    pub fn rollback(&mut self) -> Result<()> {
        match self.snapshot.take() {
            Some(snapshot) => {
                debug!(
                    entity = %self.record.entity_name(),
                    id = %self.record.id(),
                    "rolling back manual transaction"
                );
                snapshot.restore(self.record)
            }
            None => Err(Error::CorruptTransaction),
        }
    }
}
