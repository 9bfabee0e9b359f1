//! Store error types
//!
//! Error codes:
//! - PITCH_STORE_SCHEMA_VIOLATION (REJECT): table does not match the frozen
//!   contract; never retried.
//! - PITCH_STORE_TABLE_NOT_FOUND (REJECT)
//! - PITCH_STORE_COLUMN_NOT_FOUND (REJECT)
//! - PITCH_POOL_EXHAUSTED (RETRY): transient resource pressure; callers may
//!   retry with backoff.
//! - PITCH_POOL_TIMEOUT (RETRY)
//! - PITCH_POOL_CLOSED (REJECT)

use std::fmt;

use crate::schema::SchemaError;

/// Store module result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    PitchStoreSchemaViolation,
    PitchStoreTableNotFound,
    PitchStoreColumnNotFound,
    PitchPoolExhausted,
    PitchPoolTimeout,
    PitchPoolClosed,
}

impl StoreErrorCode {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::PitchStoreSchemaViolation => "PITCH_STORE_SCHEMA_VIOLATION",
            StoreErrorCode::PitchStoreTableNotFound => "PITCH_STORE_TABLE_NOT_FOUND",
            StoreErrorCode::PitchStoreColumnNotFound => "PITCH_STORE_COLUMN_NOT_FOUND",
            StoreErrorCode::PitchPoolExhausted => "PITCH_POOL_EXHAUSTED",
            StoreErrorCode::PitchPoolTimeout => "PITCH_POOL_TIMEOUT",
            StoreErrorCode::PitchPoolClosed => "PITCH_POOL_CLOSED",
        }
    }

    /// Whether a caller may retry the operation with backoff.
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            StoreErrorCode::PitchPoolExhausted | StoreErrorCode::PitchPoolTimeout
        )
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store failures.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Ingested table does not match the frozen contract
    SchemaViolation(SchemaError),
    /// Query targets a table that is not present
    TableNotFound(String),
    /// Query references a column the target table does not carry
    ColumnNotFound { table: String, column: String },
    /// Pool at its ceiling with no acquisition timeout configured
    PoolExhausted { max_connections: usize },
    /// Acquisition timeout elapsed before a connection freed up
    ConnectionTimeout { waited_ms: u64 },
    /// Pool already closed
    PoolClosed,
}

impl StoreError {
    /// Returns the error code
    pub fn code(&self) -> StoreErrorCode {
        match self {
            StoreError::SchemaViolation(_) => StoreErrorCode::PitchStoreSchemaViolation,
            StoreError::TableNotFound(_) => StoreErrorCode::PitchStoreTableNotFound,
            StoreError::ColumnNotFound { .. } => StoreErrorCode::PitchStoreColumnNotFound,
            StoreError::PoolExhausted { .. } => StoreErrorCode::PitchPoolExhausted,
            StoreError::ConnectionTimeout { .. } => StoreErrorCode::PitchPoolTimeout,
            StoreError::PoolClosed => StoreErrorCode::PitchPoolClosed,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::SchemaViolation(inner) => {
                write!(f, "[{}] {}", self.code().code(), inner)
            }
            StoreError::TableNotFound(name) => {
                write!(f, "[{}] table '{}' not found", self.code().code(), name)
            }
            StoreError::ColumnNotFound { table, column } => write!(
                f,
                "[{}] column '{}' not found in table '{}'",
                self.code().code(),
                column,
                table
            ),
            StoreError::PoolExhausted { max_connections } => write!(
                f,
                "[{}] all {} connections leased and no timeout set",
                self.code().code(),
                max_connections
            ),
            StoreError::ConnectionTimeout { waited_ms } => write!(
                f,
                "[{}] no connection freed within {}ms",
                self.code().code(),
                waited_ms
            ),
            StoreError::PoolClosed => {
                write!(f, "[{}] connection pool is closed", self.code().code())
            }
        }
    }
}

impl std::error::Error for StoreError {}

impl From<SchemaError> for StoreError {
    fn from(err: SchemaError) -> Self {
        StoreError::SchemaViolation(err)
    }
}
