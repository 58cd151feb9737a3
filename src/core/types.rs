use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Value;

/// Stable identity of a counter configuration record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CounterId(Uuid);

impl CounterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CounterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque marker that changes on every committed write to a record.
///
/// Only ever compared for equality; holders must not derive meaning
/// from its contents or ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(Uuid);

impl VersionToken {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw counter record as the store keeps it: an attribute map keyed by
/// schema-specific names, plus the version token the store bumps on
/// every committed write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: CounterId,
    pub version: VersionToken,
    pub modified_on: DateTime<Utc>,
    pub attributes: HashMap<String, Value>,
}

impl Record {
    pub fn new(id: CounterId) -> Self {
        Self {
            id,
            version: VersionToken::fresh(),
            modified_on: Utc::now(),
            attributes: HashMap::new(),
        }
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: Value) {
        self.attributes.insert(attribute.into(), value);
    }
}

/// Typed view of a counter record, decoded through a
/// [`SchemaMapping`](crate::store::SchemaMapping).
///
/// A snapshot: `next_value` and `version` are only as fresh as the read
/// that produced them, which is exactly what the conditional increment
/// checks against.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterConfig {
    pub id: CounterId,
    /// Human-readable label, surfaced in diagnostics only.
    pub name: Option<String>,
    pub entity_type: String,
    /// Field on target records that receives the rendered number.
    pub target_field: String,
    pub format_pattern: String,
    /// Next value to allocate; monotonically non-decreasing.
    pub next_value: i64,
    pub version: VersionToken,
    pub is_active: bool,
}
