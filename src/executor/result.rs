//! Execution results

use crate::cache::CachedValue;

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Cache,
    Compute,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::Cache => "cache",
            ResultSource::Compute => "compute",
        }
    }
}

/// Provenance attached to every result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultMetadata {
    /// Deterministic cache key the result was stored or found under
    pub query_hash: String,
    /// Snapshot the result was computed against
    pub snapshot_id: String,
    pub execution_time_ms: u64,
    pub source: ResultSource,
    pub engine_version: String,
}

/// A query answer plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub data: CachedValue,
    pub meta: ResultMetadata,
}
