//! Canonicalization error types

use thiserror::Error;

use crate::registry::RegistryError;
use crate::schema::SchemaError;

/// Canonicalization result type
pub type CanonicalResult<T> = Result<T, CanonicalError>;

/// Failures while turning a raw match document into an event table.
#[derive(Debug, Error)]
pub enum CanonicalError {
    /// The built table failed the frozen-contract gatekeeper check.
    /// Fatal for this match; batch callers should skip it and continue.
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaError),

    /// Name resolution failed (cannot happen with auto-ingest enabled,
    /// surfaced for completeness).
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A raw value does not fit the narrow integer type its column carries.
    /// Fatal for this match; the value would otherwise wrap silently.
    #[error("column '{column}': value {value} out of range")]
    OutOfRange { column: &'static str, value: i128 },
}
