//! Core types and traits for reposit
//!
//! This crate defines the foundational types used throughout the engine:
//! - RecordId: Unique identifier for stored records
//! - Timestamp: Microsecond-precision record metadata time
//! - Value: Unified value enum for all attribute data
//! - EntityType / FieldDef: Per-type declarations built at registration
//! - Record / RecordState: Cheap-clone handles over locked attribute state
//! - AttributeResolver / Resolution: Dotted-path resolution
//! - RefSource: Seam for dereferencing record references
//! - Error: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

// Module declarations
pub mod entity;
pub mod error;
pub mod record;
pub mod resolve;
pub mod timestamp;
pub mod traits;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use entity::{is_reserved_attribute, EntityType, FieldDef, RESERVED_ATTRIBUTES};
pub use error::{Error, Result};
pub use record::{Record, RecordState};
pub use resolve::{AttributeResolver, Resolution};
pub use timestamp::Timestamp;
pub use traits::{NoRefs, RefSource};
pub use types::RecordId;
pub use value::Value;
