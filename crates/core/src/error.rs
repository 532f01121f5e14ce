//! Error types for the reposit engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every fallible operation in the workspace returns [`Result`]. Errors are
//! never logged and swallowed; they propagate synchronously to the caller.

use thiserror::Error;

/// Result type alias for reposit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the reposit engine
#[derive(Debug, Error)]
pub enum Error {
    /// No record matched a `get()` lookup
    #[error("{entity} object matching query does not exist.")]
    DoesNotExist {
        /// Entity type the lookup ran against
        entity: String,
    },

    /// More than one record matched a `get()` lookup
    #[error("get() returned more than one {entity} object -- it returned {count}!")]
    MultipleObjectsReturned {
        /// Entity type the lookup ran against
        entity: String,
        /// Number of records that matched
        count: usize,
    },

    /// A dotted path failed to resolve where resolution is required
    #[error("{entity} has no attribute {path:?}")]
    MissingAttribute {
        /// Entity type of the record being resolved
        entity: String,
        /// The full path that was attempted
        path: String,
    },

    /// `order_by()` was called without any field paths
    #[error("order_by() requires at least one field path")]
    NoOrderFields,

    /// A lookup verb or ordering was applied across incompatible value types
    #[error("cannot apply {op} to {lhs} and {rhs} values")]
    TypeMismatch {
        /// The operation that failed (verb name or "ordering")
        op: &'static str,
        /// Type name of the left operand
        lhs: &'static str,
        /// Type name of the right operand
        rhs: &'static str,
    },

    /// Flat projection requested over more than one field
    #[error("/flat/ is not valid when values_list is called with more than one field.")]
    FlatOnMultipleFields,

    /// Two result sets of different entity types were combined
    #[error("entity type mismatch: {left} vs {right}")]
    EntityMismatch {
        /// Entity type of the left-hand side
        left: String,
        /// Entity type of the right-hand side
        right: String,
    },

    /// `create()` received an attribute the entity type does not declare
    #[error("{entity} does not declare attribute {attribute:?}")]
    UndeclaredAttribute {
        /// Entity type being constructed
        entity: String,
        /// The undeclared attribute name
        attribute: String,
    },

    /// A system-managed attribute name was supplied by the caller
    #[error("attribute {attribute:?} is reserved and assigned by the store")]
    ReservedAttribute {
        /// The reserved attribute name
        attribute: String,
    },

    /// Lookup of an entity type that was never registered
    #[error("no entity type registered under {name:?}")]
    UnknownEntity {
        /// The unregistered type name
        name: String,
    },

    /// Registration under an entity type name that is already taken
    #[error("entity type {name:?} is already registered")]
    DuplicateEntity {
        /// The conflicting type name
        name: String,
    },

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Rollback was requested but no snapshot had been captured
    #[error("corrupt transaction: rollback without a captured snapshot")]
    CorruptTransaction,

    /// Data corruption detected
    #[error("Data corruption: {0}")]
    Corruption(String),
}
