//! Dotted attribute path resolution
//!
//! Lookup paths address nested data with `.` separators: the first segment
//! resolves against the record (identity, timestamps, or an attribute), and
//! each further segment steps into the current value. `Map` values resolve
//! by key; `Ref` values are dereferenced through a [`RefSource`] and the
//! walk continues on the target record.
//!
//! Resolution never errors. A segment that cannot be resolved, a reference
//! whose target is gone, or a value that cannot be traversed all yield
//! [`Resolution::Absent`]; callers decide whether absence means
//! "non-matching" (filter atoms) or "error" (ordering and projection).

use crate::record::Record;
use crate::traits::RefSource;
use crate::value::Value;

/// Outcome of resolving a dotted path against a record
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Every segment resolved; carries the final value
    Found(Value),
    /// Some segment failed to resolve
    Absent,
}

impl Resolution {
    /// The resolved value, if any
    pub fn found(self) -> Option<Value> {
        match self {
            Resolution::Found(v) => Some(v),
            Resolution::Absent => None,
        }
    }

    /// Whether resolution failed
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolution::Absent)
    }
}

/// Resolves dotted attribute paths against records
///
/// Holds the reference source for the duration of one query operation; the
/// engine passes its database, detached evaluation passes
/// [`NoRefs`](crate::traits::NoRefs).
pub struct AttributeResolver<'a> {
    refs: &'a dyn RefSource,
}

impl<'a> AttributeResolver<'a> {
    /// Create a resolver over the given reference source
    pub fn new(refs: &'a dyn RefSource) -> Self {
        AttributeResolver { refs }
    }

    /// Resolve a dotted path against a record
    pub fn resolve(&self, record: &Record, path: &str) -> Resolution {
        let mut segments = path.split('.');

        let first = match segments.next() {
            Some(s) if !s.is_empty() => s,
            _ => return Resolution::Absent,
        };
        let mut current = match record.field(first) {
            Some(v) => v,
            None => return Resolution::Absent,
        };

        for segment in segments {
            if segment.is_empty() {
                return Resolution::Absent;
            }
            current = match current {
                Value::Map(ref map) => match map.get(segment) {
                    Some(v) => v.clone(),
                    None => return Resolution::Absent,
                },
                Value::Ref { ref entity, id } => {
                    let target = match self.refs.deref_ref(entity, id) {
                        Some(t) => t,
                        None => return Resolution::Absent,
                    };
                    match target.field(segment) {
                        Some(v) => v,
                        None => return Resolution::Absent,
                    }
                }
                _ => return Resolution::Absent,
            };
        }

        Resolution::Found(current)
    }
}
