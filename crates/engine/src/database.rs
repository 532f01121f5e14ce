//! Database registry and configuration
//!
//! The [`Database`] owns one [`Store`] per registered entity type plus the
//! relation resolvers induced by `Reference` field declarations. It is a
//! cheap-clone handle (`Arc` inner); every [`Manager`] and
//! [`QueryResult`](crate::QueryResult) carries one, which is how query
//! evaluation dereferences `Value::Ref` values and how scoped creation
//! reaches the right store.
//!
//! ## Registration
//!
//! [`Database::register`] is the only way a store comes to exist. It
//! validates the field declarations, installs a [`RelationResolver`] for
//! each `Reference` field, and hands back the type's [`Manager`]. A
//! reference may target a type that registers later; the resolver only
//! needs the target store once referrers are actually queried.

use crate::manager::Manager;
use crate::relation::{RelationResolver, RelationSpec};
use crate::store::Store;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use reposit_core::{
    is_reserved_attribute, EntityType, Error, Record, RecordId, RefSource, Result,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Behavioral switches for a [`Database`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DatabaseConfig {
    /// When true, every tracked attribute mutation refreshes the record's
    /// `updated` timestamp. Off by default: `updated` stays equal to
    /// `created` until explicitly managed by the caller.
    pub refresh_updated: bool,
}

struct DatabaseInner {
    config: DatabaseConfig,
    stores: DashMap<String, Arc<Store>>,
    relations: DashMap<(String, String), Arc<RelationSpec>>,
    by_target: DashMap<String, Vec<Arc<RelationSpec>>>,
}

/// Registry of entity types, their stores, and their relations
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Create an empty database with default configuration
    pub fn new() -> Self {
        Self::with_config(DatabaseConfig::default())
    }

    /// Create an empty database with the given configuration
    pub fn with_config(config: DatabaseConfig) -> Self {
        Database {
            inner: Arc::new(DatabaseInner {
                config,
                stores: DashMap::new(),
                relations: DashMap::new(),
                by_target: DashMap::new(),
            }),
        }
    }

    /// The configuration this database was created with
    pub fn config(&self) -> DatabaseConfig {
        self.inner.config
    }

    /// Register an entity type and get its [`Manager`]
    ///
    /// Installs one [`RelationResolver`] per declared `Reference` field,
    /// keyed by (owner, attribute) and indexed by target type.
    ///
    /// # Errors
    ///
    /// - `ReservedAttribute` if a field declaration uses `id`, `created`
    ///   or `updated`
    /// - `InvalidOperation` if two fields share a name
    /// - `DuplicateEntity` if the type name is already registered
    pub fn register(&self, entity: EntityType) -> Result<Manager> {
        let name = entity.name().to_string();

        let mut seen = HashSet::new();
        for field in entity.fields() {
            if is_reserved_attribute(field.name()) {
                return Err(Error::ReservedAttribute {
                    attribute: field.name().to_string(),
                });
            }
            if !seen.insert(field.name()) {
                return Err(Error::InvalidOperation(format!(
                    "duplicate field {:?} on entity type {}",
                    field.name(),
                    name
                )));
            }
        }

        let entity = Arc::new(entity);
        let store = Arc::new(Store::new(entity.clone()));
        match self.inner.stores.entry(name.clone()) {
            Entry::Occupied(_) => return Err(Error::DuplicateEntity { name }),
            Entry::Vacant(slot) => {
                slot.insert(store.clone());
            }
        }

        for field in entity.references() {
            if let Some(target) = field.target() {
                let spec = Arc::new(RelationSpec {
                    owner: name.clone(),
                    attribute: field.name().to_string(),
                    target: target.to_string(),
                });
                self.inner
                    .relations
                    .insert((name.clone(), field.name().to_string()), spec.clone());
                self.inner
                    .by_target
                    .entry(target.to_string())
                    .or_default()
                    .push(spec);
            }
        }

        info!(entity = %name, "entity type registered");
        Ok(Manager::new(entity, store, self.clone()))
    }

    /// The [`Manager`] for a registered entity type
    ///
    /// # Errors
    ///
    /// Returns `UnknownEntity` if no type was registered under `name`.
    pub fn manager(&self, name: &str) -> Result<Manager> {
        let store = self.store(name)?;
        Ok(Manager::new(store.entity().clone(), store, self.clone()))
    }

    /// Whether an entity type is registered under `name`
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.stores.contains_key(name)
    }

    pub(crate) fn store(&self, name: &str) -> Result<Arc<Store>> {
        self.inner
            .stores
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::UnknownEntity {
                name: name.to_string(),
            })
    }

    /// The resolver for one declared `Reference` field, if it exists
    ///
    /// Resolvers are installed once at registration; repeated calls hand
    /// back the same resolver.
    pub fn relation(&self, owner: &str, attribute: &str) -> Option<RelationResolver> {
        self.inner
            .relations
            .get(&(owner.to_string(), attribute.to_string()))
            .map(|entry| RelationResolver::new(entry.value().clone(), self.clone()))
    }

    /// Every resolver whose target is the named entity type
    pub fn reverse(&self, target: &str) -> Vec<RelationResolver> {
        self.inner
            .by_target
            .get(target)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|spec| RelationResolver::new(spec.clone(), self.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl RefSource for Database {
    fn deref_ref(&self, entity: &str, id: RecordId) -> Option<Record> {
        let store = self.inner.stores.get(entity)?.value().clone();
        store.by_id(id)
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.inner.config)
            .field("entities", &self.inner.stores.len())
            .finish()
    }
}
