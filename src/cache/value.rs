//! Cacheable values

use crate::table::Table;

/// What a query produces and the cache stores.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    /// A columnar result set.
    Table(Table),
    /// A single computed value, e.g. a probability.
    Scalar(serde_json::Value),
}

impl CachedValue {
    /// Rows for tables, 1 for scalars. Used in log lines.
    pub fn row_count(&self) -> usize {
        match self {
            CachedValue::Table(t) => t.num_rows(),
            CachedValue::Scalar(_) => 1,
        }
    }
}
