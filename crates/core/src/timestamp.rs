//! Microsecond-precision timestamp type
//!
//! Records carry two timestamps, `created` and `updated`, both captured when
//! the record is inserted into its store. Timestamps are stored as
//! microseconds since Unix epoch (1970-01-01 00:00:00 UTC) and project into
//! `Value::Int` for use in lookups and ordering.

use crate::value::Value;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Microsecond-precision timestamp
///
/// Represents a point in time as microseconds since Unix epoch. This is the
/// canonical time representation for record metadata.
///
/// ## Invariants
///
/// - Timestamps are always in microseconds
/// - Timestamps are comparable and orderable
/// - The zero timestamp represents Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Unix epoch (1970-01-01 00:00:00 UTC)
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Create a timestamp for the current moment
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp_micros())
    }

    /// Create a timestamp from microseconds since epoch
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    /// Create a timestamp from milliseconds since epoch
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        Timestamp(millis.saturating_mul(1_000))
    }

    /// Create a timestamp from seconds since epoch
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Get microseconds since Unix epoch
    #[inline]
    pub const fn as_micros(&self) -> i64 {
        self.0
    }

    /// Get milliseconds since Unix epoch (truncates)
    #[inline]
    pub const fn as_millis(&self) -> i64 {
        self.0 / 1_000
    }

    /// Get seconds since Unix epoch (truncates)
    #[inline]
    pub const fn as_secs(&self) -> i64 {
        self.0 / 1_000_000
    }

    /// Convert to a chrono UTC datetime
    ///
    /// Returns None if the timestamp is outside chrono's representable range.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_micros(self.0).single()
    }

    /// Check if this timestamp is before another
    #[inline]
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.0 < other.0
    }

    /// Check if this timestamp is after another
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::EPOCH
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.6fZ")),
            None => write!(f, "{}us", self.0),
        }
    }
}

// ============================================================================
// From Implementations
// ============================================================================

impl From<i64> for Timestamp {
    /// Create from raw microseconds
    fn from(micros: i64) -> Self {
        Timestamp::from_micros(micros)
    }
}

impl From<Timestamp> for i64 {
    /// Extract raw microseconds
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl From<Timestamp> for Value {
    /// Project into the value model as integer microseconds
    fn from(ts: Timestamp) -> Self {
        Value::Int(ts.0)
    }
}
