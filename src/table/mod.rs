//! Columnar table values
//!
//! Tables are immutable once built: ingestion either replaces a stored table
//! or concatenates a new one onto it, producing a fresh value. Cell access is
//! typed; callers that need a widened view use the `*_at` accessors.

mod column;

pub use column::{Column, DictColumn};

use crate::schema::errors::{SchemaError, SchemaResult};

/// An ordered collection of named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<(String, Column)>,
}

impl Table {
    /// Builds a table from named columns, enforcing equal lengths.
    pub fn new(columns: Vec<(String, Column)>) -> SchemaResult<Self> {
        if let Some((first_name, first)) = columns.first() {
            let expected = first.len();
            for (name, col) in &columns {
                if col.len() != expected {
                    return Err(SchemaError::length_mismatch(
                        name,
                        col.len(),
                        first_name,
                        expected,
                    ));
                }
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows (zero for a table with no columns).
    pub fn num_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Named columns in declaration order.
    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    /// Concatenates `other` below `self`. Column names, order and types must
    /// match exactly; the caller (the store) has already validated both sides
    /// against the same contract.
    pub fn concat(&self, other: &Table) -> SchemaResult<Table> {
        if self.num_columns() != other.num_columns() {
            return Err(SchemaError::column_count_mismatch(
                self.num_columns(),
                other.num_columns(),
            ));
        }
        let mut merged = Vec::with_capacity(self.columns.len());
        for ((name_a, col_a), (name_b, col_b)) in self.columns.iter().zip(other.columns.iter()) {
            if name_a != name_b {
                return Err(SchemaError::column_order(name_b, name_a));
            }
            merged.push((name_a.clone(), col_a.concat(col_b)?));
        }
        Table::new(merged)
    }

    /// Integer view of a cell, widening Int8/Int16/Int32/Int64.
    pub fn int_at(&self, name: &str, row: usize) -> Option<i64> {
        self.column(name).and_then(|c| c.int_at(row))
    }

    /// String view of a cell (Utf8 or dictionary-encoded).
    pub fn str_at(&self, name: &str, row: usize) -> Option<&str> {
        self.column(name).and_then(|c| c.str_at(row))
    }

    /// Boolean view of a cell.
    pub fn bool_at(&self, name: &str, row: usize) -> Option<bool> {
        self.column(name).and_then(|c| c.bool_at(row))
    }

    /// Float view of a cell.
    pub fn float_at(&self, name: &str, row: usize) -> Option<f64> {
        self.column(name).and_then(|c| c.float_at(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_col_table() -> Table {
        Table::new(vec![
            ("id".to_string(), Column::Int32(vec![1, 2, 3])),
            (
                "name".to_string(),
                Column::Utf8(vec!["a".into(), "b".into(), "c".into()]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let result = Table::new(vec![
            ("id".to_string(), Column::Int32(vec![1, 2])),
            ("name".to_string(), Column::Utf8(vec!["a".into()])),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cell_accessors() {
        let t = two_col_table();
        assert_eq!(t.num_rows(), 3);
        assert_eq!(t.int_at("id", 1), Some(2));
        assert_eq!(t.str_at("name", 2), Some("c"));
        assert_eq!(t.int_at("missing", 0), None);
    }

    #[test]
    fn test_concat_appends_rows() {
        let t = two_col_table();
        let merged = t.concat(&t).unwrap();
        assert_eq!(merged.num_rows(), 6);
        assert_eq!(merged.int_at("id", 4), Some(2));
    }

    #[test]
    fn test_concat_rejects_reordered_columns() {
        let t = two_col_table();
        let reordered = Table::new(vec![
            (
                "name".to_string(),
                Column::Utf8(vec!["a".into(), "b".into(), "c".into()]),
            ),
            ("id".to_string(), Column::Int32(vec![1, 2, 3])),
        ])
        .unwrap();
        assert!(t.concat(&reordered).is_err());
    }
}
