//! Registry error types
//!
//! Error codes:
//! - PITCH_ENTITY_NOT_FOUND (REJECT): recoverable, retry with auto-ingest
//!   enabled or fix the input name.
//! - PITCH_ALIAS_OVERLAP (REJECT): the new validity window intersects an
//!   existing window for the same alias text.

use std::fmt;

use chrono::NaiveDate;

use super::entity::EntityKind;

/// Registry module result type
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorCode {
    /// Name unresolved and auto-ingest disabled
    PitchEntityNotFound,
    /// Alias validity window overlaps an existing one
    PitchAliasOverlap,
}

impl RegistryErrorCode {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryErrorCode::PitchEntityNotFound => "PITCH_ENTITY_NOT_FOUND",
            RegistryErrorCode::PitchAliasOverlap => "PITCH_ALIAS_OVERLAP",
        }
    }
}

impl fmt::Display for RegistryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A registry failure carrying the context needed to diagnose it.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    /// Name unresolved at the given date and auto-ingest disabled
    EntityNotFound {
        name: String,
        kind: EntityKind,
        as_of: NaiveDate,
    },
    /// New alias window intersects an existing window for the same text
    AliasOverlap {
        alias_text: String,
        existing_from: NaiveDate,
    },
}

impl RegistryError {
    /// Returns the error code
    pub fn code(&self) -> RegistryErrorCode {
        match self {
            RegistryError::EntityNotFound { .. } => RegistryErrorCode::PitchEntityNotFound,
            RegistryError::AliasOverlap { .. } => RegistryErrorCode::PitchAliasOverlap,
        }
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::EntityNotFound { name, kind, as_of } => write!(
                f,
                "[{}] entity '{}' of kind {} not found for date {}",
                self.code().code(),
                name,
                kind,
                as_of
            ),
            RegistryError::AliasOverlap {
                alias_text,
                existing_from,
            } => write!(
                f,
                "[{}] alias '{}' overlaps an existing window starting {}",
                self.code().code(),
                alias_text,
                existing_from
            ),
        }
    }
}

impl std::error::Error for RegistryError {}
