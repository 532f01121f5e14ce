//! Per-type record creation and query entry points
//!
//! A [`Manager`] is the handle [`Database::register`] returns: a facade
//! over one entity type's [`Store`] that creates records and opens the
//! query pipeline. Managers are cheap to clone and most of their query
//! surface proxies to [`QueryResult`] over a fresh `all()` snapshot.
//!
//! [`Database::register`]: crate::Database::register

use crate::database::Database;
use crate::result::QueryResult;
use crate::store::Store;
use reposit_core::{is_reserved_attribute, EntityType, Error, Record, Result, Value};
use reposit_query::IntoPredicate;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Anything that can stand where creation attributes are expected
///
/// Covers an attribute map directly, and `(name, value)` pair collections
/// for literal call sites.
pub trait IntoAttrs {
    /// Build the attribute map this value describes
    fn into_attrs(self) -> BTreeMap<String, Value>;
}

impl IntoAttrs for BTreeMap<String, Value> {
    fn into_attrs(self) -> BTreeMap<String, Value> {
        self
    }
}

impl<V: Into<Value>, const N: usize> IntoAttrs for [(&str, V); N] {
    fn into_attrs(self) -> BTreeMap<String, Value> {
        self.into_iter()
            .map(|(name, value)| (name.to_string(), value.into()))
            .collect()
    }
}

impl<V: Into<Value> + Clone> IntoAttrs for &[(&str, V)] {
    fn into_attrs(self) -> BTreeMap<String, Value> {
        self.iter()
            .map(|(name, value)| (name.to_string(), value.clone().into()))
            .collect()
    }
}

impl<V: Into<Value>> IntoAttrs for Vec<(&str, V)> {
    fn into_attrs(self) -> BTreeMap<String, Value> {
        self.into_iter()
            .map(|(name, value)| (name.to_string(), value.into()))
            .collect()
    }
}

/// Creation and query facade for one registered entity type
#[derive(Clone)]
pub struct Manager {
    entity: Arc<EntityType>,
    store: Arc<Store>,
    db: Database,
}

impl Manager {
    pub(crate) fn new(entity: Arc<EntityType>, store: Arc<Store>, db: Database) -> Self {
        Manager { entity, store, db }
    }

    /// The entity type this manager creates and queries
    pub fn entity(&self) -> &Arc<EntityType> {
        &self.entity
    }

    /// The entity type's name
    pub fn entity_name(&self) -> &str {
        self.entity.name()
    }

    /// Create a record and append it to the store
    ///
    /// Identity and the `created`/`updated` timestamps are assigned here;
    /// the caller supplies only declared attributes.
    ///
    /// # Errors
    ///
    /// - `ReservedAttribute` if `id`, `created` or `updated` is supplied
    /// - `UndeclaredAttribute` if a name is not declared on the entity type
    ///
    /// # Example
    ///
    /// ```
    /// use reposit_engine::Database;
    /// use reposit_core::EntityType;
    ///
    /// let db = Database::new();
    /// let books = db.register(EntityType::new("Book").attribute("title"))?;
    /// let dune = books.create([("title", "Dune")])?;
    /// assert_eq!(books.count(), 1);
    /// # Ok::<(), reposit_core::Error>(())
    /// ```
    pub fn create(&self, attrs: impl IntoAttrs) -> Result<Record> {
        let attrs = attrs.into_attrs();
        for name in attrs.keys() {
            if is_reserved_attribute(name) {
                return Err(Error::ReservedAttribute {
                    attribute: name.clone(),
                });
            }
            if !self.entity.declares(name) {
                return Err(Error::UndeclaredAttribute {
                    entity: self.entity.name().to_string(),
                    attribute: name.clone(),
                });
            }
        }

        let record = Record::new(
            self.entity.clone(),
            attrs,
            self.db.config().refresh_updated,
        );
        self.store.add(record.clone())?;
        debug!(entity = %self.entity.name(), id = %record.id(), "record created");
        Ok(record)
    }

    /// Every live record, in insertion order
    pub fn all(&self) -> QueryResult {
        QueryResult::new(self.entity.clone(), self.store.snapshot(), self.db.clone())
    }

    /// An empty result for this entity type
    ///
    /// Useful as the identity element when reducing over unions.
    pub fn none(&self) -> QueryResult {
        QueryResult::new(self.entity.clone(), Vec::new(), self.db.clone())
    }

    /// Number of live records
    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// Whether any record exists
    pub fn exists(&self) -> bool {
        !self.store.is_empty()
    }

    /// Records matching the filter specification, in insertion order
    pub fn filter<S: IntoPredicate>(&self, spec: S) -> Result<QueryResult> {
        self.all().filter(spec)
    }

    /// Records not matching the filter specification
    pub fn exclude<S: IntoPredicate>(&self, spec: S) -> Result<QueryResult> {
        self.all().exclude(spec)
    }

    /// The single record matching the filter specification
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` on zero matches
    /// - `MultipleObjectsReturned` on more than one match
    pub fn get<S: IntoPredicate>(&self, spec: S) -> Result<Record> {
        self.all().get(spec)
    }

    /// Fetch the record matching `pairs`, creating it if absent
    ///
    /// See [`QueryResult::get_or_create`] for the exact lookup and
    /// creation contract.
    pub fn get_or_create(
        &self,
        pairs: &[(&str, Value)],
        defaults: &[(&str, Value)],
    ) -> Result<(Record, bool)> {
        self.all().get_or_create(pairs, defaults)
    }

    /// The earliest-created record, `None` when empty
    pub fn first(&self) -> Option<Record> {
        self.all().first()
    }

    /// The latest-created record, `None` when empty
    pub fn last(&self) -> Option<Record> {
        self.all().last()
    }

    /// The record with the smallest `created` timestamp
    pub fn earliest(&self) -> Result<Option<Record>> {
        self.all().earliest()
    }

    /// The record with the smallest value of `field`, ignoring records
    /// where the field is absent or null
    pub fn earliest_by(&self, field: &str) -> Result<Option<Record>> {
        self.all().earliest_by(field)
    }

    /// The record with the largest `created` timestamp
    pub fn latest(&self) -> Result<Option<Record>> {
        self.all().latest()
    }

    /// The record with the largest value of `field`, ignoring records
    /// where the field is absent or null
    pub fn latest_by(&self, field: &str) -> Result<Option<Record>> {
        self.all().latest_by(field)
    }

    /// One uniformly chosen record, `None` when empty
    pub fn random(&self) -> Option<Record> {
        self.all().random()
    }

    /// Up to `max` records sampled without replacement
    pub fn random_slice(&self, max: usize) -> QueryResult {
        self.all().random_slice(max)
    }

    /// Transform every record through `f`, single pass
    pub fn map<T, F>(&self, f: F) -> std::iter::Map<std::vec::IntoIter<Record>, F>
    where
        F: FnMut(Record) -> T,
    {
        self.all().map(f)
    }

    /// Remove one record from the store
    ///
    /// # Errors
    ///
    /// Returns `Corruption` if the record is not present (already removed).
    pub fn remove(&self, record: &Record) -> Result<()> {
        self.store.remove(record.id())?;
        debug!(entity = %self.entity.name(), id = %record.id(), "record deleted");
        Ok(())
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("entity", &self.entity.name())
            .finish()
    }
}
