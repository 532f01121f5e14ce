//! Reverse lookups across declared references
//!
//! A `Reference` field on entity type A targeting type B makes every A
//! record point at one B record through a `Value::Ref`. The forward
//! direction is ordinary path resolution (`"author.name"`); the reverse
//! direction, "which A records point at this B record", goes through a
//! [`RelationResolver`].
//!
//! One resolver exists per (owner type, reference attribute) pair, built at
//! registration and handed out by [`Database::relation`] and
//! [`Database::reverse`]. Two handles to the same declared relation compare
//! equal.
//!
//! [`Database::relation`]: crate::Database::relation
//! [`Database::reverse`]: crate::Database::reverse

use crate::database::Database;
use crate::result::QueryResult;
use reposit_core::{Error, Record, Result, Value};
use std::fmt;
use std::sync::Arc;

/// The declared shape of one reference field, shared by all handles
pub(crate) struct RelationSpec {
    pub(crate) owner: String,
    pub(crate) attribute: String,
    pub(crate) target: String,
}

/// Reverse accessor for one declared reference field
#[derive(Clone)]
pub struct RelationResolver {
    spec: Arc<RelationSpec>,
    db: Database,
}

impl RelationResolver {
    pub(crate) fn new(spec: Arc<RelationSpec>, db: Database) -> Self {
        RelationResolver { spec, db }
    }

    /// Entity type that declares the reference field
    pub fn owner(&self) -> &str {
        &self.spec.owner
    }

    /// Name of the reference field on the owner type
    pub fn attribute(&self) -> &str {
        &self.spec.attribute
    }

    /// Entity type the reference points at
    pub fn target(&self) -> &str {
        &self.spec.target
    }

    /// All owner-type records whose reference field points at `record`
    ///
    /// # Errors
    ///
    /// - `EntityMismatch` if `record` is not of the target type
    /// - `UnknownEntity` if the owner type has been registered away from
    ///   under this resolver (never happens through the public API)
    pub fn referrers(&self, record: &Record) -> Result<QueryResult> {
        if record.entity_name() != self.spec.target {
            return Err(Error::EntityMismatch {
                left: self.spec.target.clone(),
                right: record.entity_name().to_string(),
            });
        }
        self.db
            .manager(&self.spec.owner)?
            .filter((self.spec.attribute.as_str(), Value::from(record)))
    }
}

impl PartialEq for RelationResolver {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.spec, &other.spec)
    }
}

impl fmt::Debug for RelationResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelationResolver({}.{} -> {})",
            self.spec.owner, self.spec.attribute, self.spec.target
        )
    }
}
