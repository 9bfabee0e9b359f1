//! Schema error types
//!
//! Error codes:
//! - PITCH_SCHEMA_COLUMN_MISSING (REJECT)
//! - PITCH_SCHEMA_COLUMN_UNEXPECTED (REJECT)
//! - PITCH_SCHEMA_TYPE_MISMATCH (REJECT)
//! - PITCH_SCHEMA_COLUMN_ORDER (REJECT)
//! - PITCH_SCHEMA_MALFORMED_TABLE (REJECT)
//! - PITCH_SCHEMA_DICT_FULL (REJECT)
//!
//! Schema violations are fatal for the affected record and never retried:
//! retrying an ill-typed table cannot change the outcome. Callers doing batch
//! ingestion should skip the record and continue.

use std::fmt;

use super::contract::ColumnType;

/// Schema module result type
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Contract column absent from the table
    PitchSchemaColumnMissing,
    /// Table carries a column the contract does not declare
    PitchSchemaColumnUnexpected,
    /// Column present but with the wrong type
    PitchSchemaTypeMismatch,
    /// Columns present but not in contract order
    PitchSchemaColumnOrder,
    /// Table is internally inconsistent (ragged columns)
    PitchSchemaMalformedTable,
    /// Dictionary column ran out of u8 code space
    PitchSchemaDictFull,
}

impl SchemaErrorCode {
    /// Returns the string error code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::PitchSchemaColumnMissing => "PITCH_SCHEMA_COLUMN_MISSING",
            SchemaErrorCode::PitchSchemaColumnUnexpected => "PITCH_SCHEMA_COLUMN_UNEXPECTED",
            SchemaErrorCode::PitchSchemaTypeMismatch => "PITCH_SCHEMA_TYPE_MISMATCH",
            SchemaErrorCode::PitchSchemaColumnOrder => "PITCH_SCHEMA_COLUMN_ORDER",
            SchemaErrorCode::PitchSchemaMalformedTable => "PITCH_SCHEMA_MALFORMED_TABLE",
            SchemaErrorCode::PitchSchemaDictFull => "PITCH_SCHEMA_DICT_FULL",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A schema violation, always naming the offending column.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    code: SchemaErrorCode,
    /// The column the violation was detected on
    column: String,
    detail: String,
}

impl SchemaError {
    /// Creates a missing-column error
    pub fn column_missing(column: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::PitchSchemaColumnMissing,
            column: column.into(),
            detail: "declared by the contract but absent from the table".to_string(),
        }
    }

    /// Creates an unexpected-column error
    pub fn column_unexpected(column: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::PitchSchemaColumnUnexpected,
            column: column.into(),
            detail: "not declared by the contract".to_string(),
        }
    }

    /// Creates a type-mismatch error
    pub fn type_mismatch(column: impl Into<String>, expected: ColumnType, got: ColumnType) -> Self {
        Self {
            code: SchemaErrorCode::PitchSchemaTypeMismatch,
            column: column.into(),
            detail: format!("expected {}, got {}", expected.type_name(), got.type_name()),
        }
    }

    /// Creates a column-order error
    pub fn column_order(got: impl Into<String>, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self {
            code: SchemaErrorCode::PitchSchemaColumnOrder,
            column: got.into(),
            detail: format!("expected column '{}' at this position", expected),
        }
    }

    /// Creates a ragged-column error
    pub fn length_mismatch(
        column: impl Into<String>,
        len: usize,
        reference: &str,
        expected: usize,
    ) -> Self {
        Self {
            code: SchemaErrorCode::PitchSchemaMalformedTable,
            column: column.into(),
            detail: format!("has {} rows but '{}' has {}", len, reference, expected),
        }
    }

    /// Creates a dictionary-overflow error
    pub fn dictionary_full(column: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::PitchSchemaDictFull,
            column: column.into(),
            detail: "dictionary code space exhausted at 256 distinct values".to_string(),
        }
    }

    /// Creates a column-count error
    pub fn column_count_mismatch(got: usize, expected: usize) -> Self {
        Self {
            code: SchemaErrorCode::PitchSchemaMalformedTable,
            column: "<table>".to_string(),
            detail: format!("has {} columns, expected {}", got, expected),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the offending column name
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] column '{}': {}",
            self.code.code(),
            self.column,
            self.detail
        )
    }
}

impl std::error::Error for SchemaError {}
