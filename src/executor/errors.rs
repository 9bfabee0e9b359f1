//! Executor error types

use thiserror::Error;

use crate::cache::CacheError;
use crate::planner::PlannerError;
use crate::store::StoreError;

/// What broke underneath a failed execution.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Planner(#[from] PlannerError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("[PITCH_EXEC_QUERY_FAILED] query {query_hash} failed: {source}")]
    QueryExecutionFailed {
        query_hash: String,
        #[source]
        source: FailureCause,
    },
}

impl ExecutorError {
    pub fn failed(query_hash: &str, source: impl Into<FailureCause>) -> Self {
        ExecutorError::QueryExecutionFailed {
            query_hash: query_hash.to_string(),
            source: source.into(),
        }
    }

    pub fn query_hash(&self) -> &str {
        match self {
            ExecutorError::QueryExecutionFailed { query_hash, .. } => query_hash,
        }
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
