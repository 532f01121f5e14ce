//! Snapshot-based transactions for Reposit
//!
//! All-or-nothing mutation of a single record: capture the record's full
//! state up front, restore it wholesale if the scope fails. There is no
//! log and no lock escalation; rollback is a state replace under the
//! record's own write lock.
//!
//! Store membership is out of scope on purpose: deleting a record is a
//! store operation, and a rollback never resurrects it.
//!
//! ## Example
//!
//! ```
//! use reposit_core::{EntityType, Record, Result, Value};
//! use reposit_transaction::transactional;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! let entity = Arc::new(EntityType::new("Account").attribute("balance"));
//! let mut attrs = BTreeMap::new();
//! attrs.insert("balance".to_string(), Value::Int(100));
//! let account = Record::new(entity, attrs, false);
//!
//! let withdrawn: Result<i64> = transactional(&account, |acct| {
//!     acct.set("balance", 60)?;
//!     Ok(40)
//! });
//! assert_eq!(withdrawn.unwrap(), 40);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod snapshot;
pub mod transaction;

pub use snapshot::Snapshot;
pub use transaction::{transactional, Transaction};
