//! Chainable query pipeline
//!
//! A [`QueryResult`] is an ordered snapshot of records taken when
//! `all()`/`filter()` ran, tagged with its entity type and carrying a
//! [`Database`] handle for reference dereferencing and scoped creation.
//! It is never a live view: stores mutated later do not change an existing
//! result, though attribute mutations remain visible through the shared
//! record handles.
//!
//! Transforms (`filter`, `order_by`, `distinct`, ...) build new results
//! and leave the receiver untouched. Terminals (`values`, `delete`,
//! `map`, ...) leave the pipeline. Operations that evaluate predicates or
//! resolve paths are fallible; structural ones (`reverse`, `random_slice`)
//! are not.

use crate::database::Database;
use rand::seq::SliceRandom;
use reposit_core::{
    AttributeResolver, EntityType, Error, Record, Resolution, Result, Value,
};
use reposit_query::{compare, IntoPredicate, Predicate};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// What a bulk [`QueryResult::delete`] removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Total number of records removed
    pub total: usize,
    /// Removal counts keyed by entity type name
    pub per_entity: BTreeMap<String, usize>,
}

/// Ordered snapshot of records with the chainable query surface
#[derive(Clone)]
pub struct QueryResult {
    entity: Arc<EntityType>,
    records: Vec<Record>,
    db: Database,
}

impl QueryResult {
    pub(crate) fn new(entity: Arc<EntityType>, records: Vec<Record>, db: Database) -> Self {
        QueryResult {
            entity,
            records,
            db,
        }
    }

    fn with_records(&self, records: Vec<Record>) -> QueryResult {
        QueryResult {
            entity: self.entity.clone(),
            records,
            db: self.db.clone(),
        }
    }

    /// The entity type this result holds
    pub fn entity(&self) -> &Arc<EntityType> {
        &self.entity
    }

    /// The entity type's name
    pub fn entity_name(&self) -> &str {
        self.entity.name()
    }

    /// The records, in result order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate the records without consuming the result
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Number of records in this result
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether this result holds any record
    pub fn exists(&self) -> bool {
        !self.records.is_empty()
    }

    // ------------------------------------------------------------------
    // Predicate transforms
    // ------------------------------------------------------------------

    /// Keep records matching the filter specification
    ///
    /// # Errors
    ///
    /// Propagates `TypeMismatch` from predicate evaluation. Paths that do
    /// not resolve make the affected atom non-matching instead of erroring.
    pub fn filter<S: IntoPredicate>(&self, spec: S) -> Result<QueryResult> {
        self.scoped(spec.into_predicate())
    }

    /// Keep records NOT matching the filter specification
    pub fn exclude<S: IntoPredicate>(&self, spec: S) -> Result<QueryResult> {
        self.scoped(spec.into_predicate().negate())
    }

    fn scoped(&self, predicate: Predicate) -> Result<QueryResult> {
        let mut matched = Vec::new();
        for record in &self.records {
            if predicate.matches(record, &self.db)? {
                matched.push(record.clone());
            }
        }
        Ok(self.with_records(matched))
    }

    /// The single record matching the filter specification
    ///
    /// # Errors
    ///
    /// - `DoesNotExist` on zero matches
    /// - `MultipleObjectsReturned` on more than one match, reporting the count
    pub fn get<S: IntoPredicate>(&self, spec: S) -> Result<Record> {
        let matched = self.filter(spec)?;
        match matched.records.as_slice() {
            [] => Err(Error::DoesNotExist {
                entity: self.entity.name().to_string(),
            }),
            [one] => Ok(one.clone()),
            many => Err(Error::MultipleObjectsReturned {
                entity: self.entity.name().to_string(),
                count: many.len(),
            }),
        }
    }

    /// Fetch the record matching `pairs`, creating it if absent
    ///
    /// The lookup uses every pair, verbs included. Creation uses only the
    /// plain top-level pairs (no `__` verb suffix, no dotted path), merged
    /// with `defaults` (defaults win on collision), and inserts into the
    /// store, not into this snapshot. Returns the record and whether it
    /// was created.
    ///
    /// # Errors
    ///
    /// `MultipleObjectsReturned` from the lookup, or any creation error.
    pub fn get_or_create(
        &self,
        pairs: &[(&str, Value)],
        defaults: &[(&str, Value)],
    ) -> Result<(Record, bool)> {
        match self.get(pairs) {
            Ok(record) => Ok((record, false)),
            Err(Error::DoesNotExist { .. }) => {
                let mut attrs: BTreeMap<String, Value> = pairs
                    .iter()
                    .filter(|(name, _)| !name.contains("__") && !name.contains('.'))
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect();
                for (name, value) in defaults {
                    attrs.insert(name.to_string(), value.clone());
                }
                let record = self.db.manager(self.entity.name())?.create(attrs)?;
                Ok((record, true))
            }
            Err(e) => Err(e),
        }
    }

    // ------------------------------------------------------------------
    // Ordering transforms
    // ------------------------------------------------------------------

    /// Sort by one or more dotted paths
    ///
    /// A leading `-` on a path reverses that key's direction. The sort is
    /// stable: equal keys retain their relative order from before sorting.
    ///
    /// # Errors
    ///
    /// - `NoOrderFields` when `paths` is empty
    /// - `MissingAttribute` when a key path fails to resolve on a record
    /// - `TypeMismatch` when two key values are incomparable
    pub fn order_by(&self, paths: &[&str]) -> Result<QueryResult> {
        if paths.is_empty() {
            return Err(Error::NoOrderFields);
        }
        let directives: Vec<(&str, bool)> = paths
            .iter()
            .map(|path| match path.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (*path, false),
            })
            .collect();

        let resolver = AttributeResolver::new(&self.db);
        let mut decorated: Vec<(SmallVec<[Value; 4]>, Record)> =
            Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut keys: SmallVec<[Value; 4]> = SmallVec::new();
            for (path, _) in &directives {
                keys.push(self.resolve_required(&resolver, record, path)?);
            }
            decorated.push((keys, record.clone()));
        }

        // sort_by gives no way to bail out, so the first comparison failure
        // is parked and the sort degenerates to a no-op
        let mut failure: Option<Error> = None;
        decorated.sort_by(|(a, _), (b, _)| {
            if failure.is_some() {
                return Ordering::Equal;
            }
            for (i, (_, descending)) in directives.iter().enumerate() {
                match compare(&a[i], &b[i]) {
                    Ok(Ordering::Equal) => continue,
                    Ok(ord) => return if *descending { ord.reverse() } else { ord },
                    Err(e) => {
                        failure = Some(e);
                        return Ordering::Equal;
                    }
                }
            }
            Ordering::Equal
        });
        if let Some(e) = failure {
            return Err(e);
        }

        Ok(self.with_records(decorated.into_iter().map(|(_, r)| r).collect()))
    }

    /// Reverse the element order
    pub fn reverse(&self) -> QueryResult {
        let mut records = self.records.clone();
        records.reverse();
        self.with_records(records)
    }

    /// Drop records duplicating an earlier one on the given key paths
    ///
    /// With no paths, the keys default to every attribute of the first
    /// record plus `id` (timestamps excluded). Scans newest-first keeping
    /// the most-recently-inserted record per key tuple, then restores
    /// ascending insertion order among the kept records. Key identity is
    /// the canonical JSON of each value; whole floats collapse with their
    /// integer counterparts the way value equality does.
    ///
    /// # Errors
    ///
    /// `MissingAttribute` when a key path fails to resolve on a record.
    pub fn distinct(&self, paths: &[&str]) -> Result<QueryResult> {
        let owned_defaults;
        let effective: Vec<&str> = if paths.is_empty() {
            match self.records.first() {
                Some(first) => {
                    let mut defaults = first.attr_names();
                    defaults.push("id".to_string());
                    owned_defaults = defaults;
                    owned_defaults.iter().map(String::as_str).collect()
                }
                None => return Ok(self.with_records(Vec::new())),
            }
        } else {
            paths.to_vec()
        };

        let resolver = AttributeResolver::new(&self.db);
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut kept: Vec<Record> = Vec::new();
        for record in self.records.iter().rev() {
            let mut key = String::new();
            for (i, path) in effective.iter().enumerate() {
                if i > 0 {
                    key.push('\u{1f}');
                }
                let value = self.resolve_required(&resolver, record, path)?;
                key.push_str(&canonical_key(&value));
            }
            if seen.insert(key) {
                kept.push(record.clone());
            }
        }
        kept.reverse();
        Ok(self.with_records(kept))
    }

    // ------------------------------------------------------------------
    // Projections
    // ------------------------------------------------------------------

    /// Project each record to a path-to-value mapping
    ///
    /// Default paths when none are given: `id`, `created`, `updated`, and
    /// the first record's attributes.
    ///
    /// # Errors
    ///
    /// `MissingAttribute` when a path fails to resolve on a record.
    pub fn values(&self, paths: &[&str]) -> Result<Vec<BTreeMap<String, Value>>> {
        let effective = self.projection_paths(paths);
        let resolver = AttributeResolver::new(&self.db);
        let mut rows = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut row = BTreeMap::new();
            for path in &effective {
                row.insert(
                    path.clone(),
                    self.resolve_required(&resolver, record, path)?,
                );
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Project each record to a value tuple in path order
    ///
    /// Same defaults as [`values`](QueryResult::values); the default column
    /// order is `id`, `created`, `updated`, then attribute names sorted.
    pub fn values_list(&self, paths: &[&str]) -> Result<Vec<Vec<Value>>> {
        let effective = self.projection_paths(paths);
        let resolver = AttributeResolver::new(&self.db);
        let mut rows = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let mut row = Vec::with_capacity(effective.len());
            for path in &effective {
                row.push(self.resolve_required(&resolver, record, path)?);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    /// Project each record to the value of a single path
    ///
    /// # Errors
    ///
    /// `FlatOnMultipleFields` when more than one path is in effect
    /// (defaults included), `MissingAttribute` on resolution failure.
    pub fn values_list_flat(&self, paths: &[&str]) -> Result<Vec<Value>> {
        let effective = self.projection_paths(paths);
        if effective.len() > 1 {
            return Err(Error::FlatOnMultipleFields);
        }
        let mut column = Vec::with_capacity(self.records.len());
        if let Some(path) = effective.first() {
            let resolver = AttributeResolver::new(&self.db);
            for record in &self.records {
                column.push(self.resolve_required(&resolver, record, path)?);
            }
        }
        Ok(column)
    }

    fn projection_paths(&self, paths: &[&str]) -> Vec<String> {
        if !paths.is_empty() {
            return paths.iter().map(|path| (*path).to_string()).collect();
        }
        match self.records.first() {
            Some(first) => {
                let mut defaults = vec![
                    "id".to_string(),
                    "created".to_string(),
                    "updated".to_string(),
                ];
                defaults.extend(first.attr_names());
                defaults
            }
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Set operations
    // ------------------------------------------------------------------

    /// Concatenate with another result and de-duplicate by identity
    ///
    /// Order is stable: first operand's records, then the second's records
    /// that were not already present.
    ///
    /// # Errors
    ///
    /// `EntityMismatch` when the operands hold different entity types.
    pub fn union(&self, other: &QueryResult) -> Result<QueryResult> {
        if self.entity.name() != other.entity.name() {
            return Err(Error::EntityMismatch {
                left: self.entity.name().to_string(),
                right: other.entity.name().to_string(),
            });
        }
        let mut combined = self.records.clone();
        combined.extend(other.records.iter().cloned());
        self.with_records(combined).distinct(&["id"])
    }

    // ------------------------------------------------------------------
    // Terminals
    // ------------------------------------------------------------------

    /// Remove every member from its store
    ///
    /// Returns the total count and a per-entity-type breakdown.
    pub fn delete(self) -> Result<DeleteOutcome> {
        let store = self.db.store(self.entity.name())?;
        let mut total = 0;
        for record in &self.records {
            store.remove(record.id())?;
            debug!(entity = %self.entity.name(), id = %record.id(), "record deleted");
            total += 1;
        }
        let mut per_entity = BTreeMap::new();
        per_entity.insert(self.entity.name().to_string(), total);
        Ok(DeleteOutcome { total, per_entity })
    }

    /// Transform every record through `f`
    ///
    /// Consumes the result; the returned iterator is single-pass by
    /// construction.
    pub fn map<T, F>(self, f: F) -> std::iter::Map<std::vec::IntoIter<Record>, F>
    where
        F: FnMut(Record) -> T,
    {
        self.records.into_iter().map(f)
    }

    /// The first record in result order, `None` when empty
    pub fn first(&self) -> Option<Record> {
        self.records.first().cloned()
    }

    /// The last record in result order, `None` when empty
    pub fn last(&self) -> Option<Record> {
        self.records.last().cloned()
    }

    /// The record with the smallest `created` timestamp
    pub fn earliest(&self) -> Result<Option<Record>> {
        self.earliest_by("created")
    }

    /// The record with the smallest value of `field`
    ///
    /// Records where the field is absent or null are ignored.
    ///
    /// # Errors
    ///
    /// `TypeMismatch` when the field's values are incomparable.
    pub fn earliest_by(&self, field: &str) -> Result<Option<Record>> {
        let spec = format!("{field}__isnone");
        Ok(self
            .filter((spec.as_str(), false))?
            .order_by(&[field])?
            .first())
    }

    /// The record with the largest `created` timestamp
    pub fn latest(&self) -> Result<Option<Record>> {
        self.latest_by("created")
    }

    /// The record with the largest value of `field`
    ///
    /// Records where the field is absent or null are ignored.
    pub fn latest_by(&self, field: &str) -> Result<Option<Record>> {
        let spec = format!("{field}__isnone");
        Ok(self
            .filter((spec.as_str(), false))?
            .order_by(&[field])?
            .last())
    }

    /// One uniformly chosen record, `None` when empty
    pub fn random(&self) -> Option<Record> {
        self.records.choose(&mut rand::thread_rng()).cloned()
    }

    /// Up to `max` records sampled without replacement
    pub fn random_slice(&self, max: usize) -> QueryResult {
        let amount = max.min(self.records.len());
        let sampled = self
            .records
            .choose_multiple(&mut rand::thread_rng(), amount)
            .cloned()
            .collect();
        self.with_records(sampled)
    }

    fn resolve_required(
        &self,
        resolver: &AttributeResolver<'_>,
        record: &Record,
        path: &str,
    ) -> Result<Value> {
        match resolver.resolve(record, path) {
            Resolution::Found(value) => Ok(value),
            Resolution::Absent => Err(Error::MissingAttribute {
                entity: self.entity.name().to_string(),
                path: path.to_string(),
            }),
        }
    }
}

impl IntoIterator for QueryResult {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl fmt::Debug for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryResult")
            .field("entity", &self.entity.name())
            .field("count", &self.records.len())
            .finish()
    }
}

/// Canonical JSON form of a value for de-duplication keys
///
/// Whole floats collapse with their integer value so that key identity
/// agrees with value equality.
fn canonical_key(value: &Value) -> String {
    serde_json::Value::from(canonical(value)).to_string()
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Float(f)
            if f.is_finite()
                && f.fract() == 0.0
                && (i64::MIN as f64..=i64::MAX as f64).contains(f) =>
        {
            Value::Int(*f as i64)
        }
        Value::List(items) => Value::List(items.iter().map(canonical).collect()),
        Value::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(name, v)| (name.clone(), canonical(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
