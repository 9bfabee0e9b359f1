//! Schema contract definition and validation
//!
//! A contract is an ordered list of `(name, type)` column definitions plus
//! metadata used for cache invalidation: when the contract version changes,
//! every cache key derived from it changes with it.
//!
//! Validation is the single gatekeeper in front of the store: a table that
//! passes `validate` is byte-layout compatible with everything already
//! ingested under the same contract version.

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use crate::table::Table;

/// Supported column types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// UTF-8 string
    Utf8,
    /// Calendar date (no time component)
    Date32,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer (aggregate outputs only)
    Int64,
    /// Boolean
    Bool,
    /// Dictionary-encoded nullable string with u8 codes
    Dict8,
    /// 64-bit floating point (derived tables only)
    Float64,
}

impl ColumnType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Utf8 => "utf8",
            ColumnType::Date32 => "date32",
            ColumnType::Int8 => "int8",
            ColumnType::Int16 => "int16",
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Bool => "bool",
            ColumnType::Dict8 => "dict8",
            ColumnType::Float64 => "float64",
        }
    }
}

/// A single column declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Column type
    pub column_type: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// An immutable schema contract with evolution metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaContract {
    /// Ordered column declarations
    pub columns: Vec<ColumnDef>,
    /// Contract version, embedded in every cache key
    pub version: String,
    /// Date the contract was frozen
    pub frozen_at: String,
    /// Evolution policy
    pub compatibility: String,
}

impl SchemaContract {
    /// Validates a table against this contract.
    ///
    /// Checks, in order: no missing columns, no undeclared columns, contract
    /// column order, exact type match. The first violation found is returned,
    /// naming the offending column.
    pub fn validate(&self, table: &Table) -> SchemaResult<()> {
        for def in &self.columns {
            if table.column(&def.name).is_none() {
                return Err(SchemaError::column_missing(&def.name));
            }
        }
        for name in table.column_names() {
            if !self.columns.iter().any(|def| def.name == name) {
                return Err(SchemaError::column_unexpected(name));
            }
        }
        for (def, (name, column)) in self.columns.iter().zip(table.columns()) {
            if &def.name != name {
                return Err(SchemaError::column_order(name.clone(), def.name.clone()));
            }
            if column.column_type() != def.column_type {
                return Err(SchemaError::type_mismatch(
                    name.clone(),
                    def.column_type,
                    column.column_type(),
                ));
            }
        }
        Ok(())
    }
}

/// The frozen v1 ball-event contract.
///
/// One row per delivery, legal or not. `phase` is materialized at ingestion
/// so queries never recompute it. Column order is part of the contract.
pub fn ball_event_v1() -> SchemaContract {
    SchemaContract {
        columns: vec![
            // Identity (who & where)
            ColumnDef::new("match_id", ColumnType::Utf8),
            ColumnDef::new("date", ColumnType::Date32),
            ColumnDef::new("venue_id", ColumnType::Int32),
            // State (when)
            ColumnDef::new("inning", ColumnType::Int8),
            ColumnDef::new("over", ColumnType::Int8),
            ColumnDef::new("ball", ColumnType::Int8),
            // Actors (ids from the registry)
            ColumnDef::new("batter_id", ColumnType::Int32),
            ColumnDef::new("bowler_id", ColumnType::Int32),
            ColumnDef::new("non_striker_id", ColumnType::Int32),
            ColumnDef::new("batting_team_id", ColumnType::Int16),
            ColumnDef::new("bowling_team_id", ColumnType::Int16),
            // Outcome (what happened)
            ColumnDef::new("runs_batter", ColumnType::Int8),
            ColumnDef::new("runs_extras", ColumnType::Int8),
            ColumnDef::new("is_wicket", ColumnType::Bool),
            ColumnDef::new("wicket_type", ColumnType::Dict8),
            // Derived context (materialized at ingestion)
            ColumnDef::new("phase", ColumnType::Dict8),
        ],
        version: "1.0.0".to_string(),
        frozen_at: "2024-01-01".to_string(),
        compatibility: "backward-only".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use crate::table::{Column, DictColumn};
    use chrono::NaiveDate;

    fn conforming_table(rows: usize) -> Table {
        let d = NaiveDate::from_ymd_opt(2023, 5, 21).unwrap();
        let dict = |value: &str| -> Column {
            let mut col = DictColumn::new();
            for _ in 0..rows {
                col.push(Some(value)).unwrap();
            }
            Column::Dict8(col)
        };
        Table::new(vec![
            ("match_id".into(), Column::Utf8(vec!["m1".into(); rows])),
            ("date".into(), Column::Date32(vec![d; rows])),
            ("venue_id".into(), Column::Int32(vec![1; rows])),
            ("inning".into(), Column::Int8(vec![1; rows])),
            ("over".into(), Column::Int8(vec![0; rows])),
            ("ball".into(), Column::Int8(vec![1; rows])),
            ("batter_id".into(), Column::Int32(vec![1; rows])),
            ("bowler_id".into(), Column::Int32(vec![2; rows])),
            ("non_striker_id".into(), Column::Int32(vec![3; rows])),
            ("batting_team_id".into(), Column::Int16(vec![1; rows])),
            ("bowling_team_id".into(), Column::Int16(vec![2; rows])),
            ("runs_batter".into(), Column::Int8(vec![0; rows])),
            ("runs_extras".into(), Column::Int8(vec![0; rows])),
            ("is_wicket".into(), Column::Bool(vec![false; rows])),
            ("wicket_type".into(), {
                let mut col = DictColumn::new();
                for _ in 0..rows {
                    col.push(None).unwrap();
                }
                Column::Dict8(col)
            }),
            ("phase".into(), dict("Powerplay")),
        ])
        .unwrap()
    }

    #[test]
    fn test_conforming_table_passes() {
        assert!(ball_event_v1().validate(&conforming_table(2)).is_ok());
    }

    #[test]
    fn test_missing_column_named() {
        let mut cols: Vec<_> = conforming_table(1).columns().to_vec();
        cols.retain(|(n, _)| n != "phase");
        let table = Table::new(cols).unwrap();
        let err = ball_event_v1().validate(&table).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::PitchSchemaColumnMissing);
        assert_eq!(err.column(), "phase");
    }

    #[test]
    fn test_extra_column_named() {
        let mut cols: Vec<_> = conforming_table(1).columns().to_vec();
        cols.push(("bonus".into(), Column::Int32(vec![9])));
        let table = Table::new(cols).unwrap();
        let err = ball_event_v1().validate(&table).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::PitchSchemaColumnUnexpected);
        assert_eq!(err.column(), "bonus");
    }

    #[test]
    fn test_mistyped_column_named() {
        let mut cols: Vec<_> = conforming_table(1).columns().to_vec();
        for (name, col) in cols.iter_mut() {
            if name == "runs_batter" {
                *col = Column::Int32(vec![0]);
            }
        }
        let table = Table::new(cols).unwrap();
        let err = ball_event_v1().validate(&table).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::PitchSchemaTypeMismatch);
        assert_eq!(err.column(), "runs_batter");
    }

    #[test]
    fn test_reordered_columns_rejected() {
        let mut cols: Vec<_> = conforming_table(1).columns().to_vec();
        cols.swap(0, 1);
        let table = Table::new(cols).unwrap();
        let err = ball_event_v1().validate(&table).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::PitchSchemaColumnOrder);
    }

    #[test]
    fn test_contract_metadata() {
        let contract = ball_event_v1();
        assert_eq!(contract.version, "1.0.0");
        assert_eq!(contract.compatibility, "backward-only");
        assert_eq!(contract.columns.len(), 16);
    }
}
