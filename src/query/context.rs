//! Execution context
//!
//! Everything outside the intent that can change a result. The context is
//! hashed into every cache key, so a new snapshot, a schema bump, a planner
//! upgrade, or a derived-table rebuild all invalidate stale entries without
//! any explicit eviction.

use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryContext {
    pub schema_version: String,
    pub snapshot_id: String,
    pub planner_version: String,
    /// Version tag per materialized derived table, sorted by name.
    pub derived_versions: BTreeMap<String, String>,
}
