//! Captured record state for rollback
//!
//! A [`Snapshot`] is a deep, independent copy of one record's attribute
//! state and timestamps, bound to the record's identity. Restoring puts
//! the whole captured state back in one atomic replace under the record's
//! write lock; nothing in between is observable.
//!
//! Snapshots say nothing about store membership. Restoring a snapshot of a
//! deleted record rewrites the record's state but does not resurrect it in
//! any store.

use reposit_core::{Error, Record, RecordId, RecordState, Result};

/// Deep copy of one record's state at a point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    record_id: RecordId,
    entity: String,
    state: RecordState,
}

impl Snapshot {
    /// Capture the record's current state
    pub fn capture(record: &Record) -> Self {
        Snapshot {
            record_id: record.id(),
            entity: record.entity_name().to_string(),
            state: record.state_snapshot(),
        }
    }

    /// Identity of the record this snapshot was captured from
    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Entity type name of the captured record
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Replace the record's state with the captured one
    ///
    /// Consumes the snapshot; a restored state cannot be restored again
    /// without recapturing.
    ///
    /// # Errors
    ///
    /// `InvalidOperation` if `record` is not the record this snapshot was
    /// captured from.
    pub fn restore(self, record: &Record) -> Result<()> {
        if record.id() != self.record_id {
            return Err(Error::InvalidOperation(format!(
                "snapshot of {} {} cannot restore record {}",
                self.entity,
                self.record_id,
                record.id()
            )));
        }
        record.restore_state(self.state);
        Ok(())
    }
}
