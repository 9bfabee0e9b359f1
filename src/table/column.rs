//! Column storage variants
//!
//! One vector per column. Repetitive low-cardinality strings (wicket kinds,
//! phases) use dictionary encoding: u8 codes into a distinct-value list,
//! with `None` codes for null cells.

use chrono::NaiveDate;

use crate::schema::errors::{SchemaError, SchemaResult};
use crate::schema::ColumnType;

/// Dictionary-encoded nullable string column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictColumn {
    codes: Vec<Option<u8>>,
    values: Vec<String>,
}

impl DictColumn {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell, interning the value on first sight.
    ///
    /// Fails once the distinct-value list exceeds the u8 code space; a code
    /// must never wrap and relabel a row.
    pub fn push(&mut self, value: Option<&str>) -> SchemaResult<()> {
        match value {
            None => self.codes.push(None),
            Some(v) => {
                let code = match self.values.iter().position(|existing| existing == v) {
                    Some(idx) => idx as u8,
                    None => {
                        if self.values.len() > u8::MAX as usize {
                            return Err(SchemaError::dictionary_full("<dict>"));
                        }
                        self.values.push(v.to_string());
                        (self.values.len() - 1) as u8
                    }
                };
                self.codes.push(Some(code));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&str> {
        self.codes
            .get(row)
            .copied()
            .flatten()
            .map(|code| self.values[code as usize].as_str())
    }

    /// Distinct values in interning order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Raw codes, one per row.
    pub fn codes(&self) -> &[Option<u8>] {
        &self.codes
    }

    fn concat(&self, other: &DictColumn) -> SchemaResult<DictColumn> {
        // Re-intern so both sides share one value list; the merged set of
        // distinct values can overflow even when neither side does.
        let mut merged = self.clone();
        for row in 0..other.len() {
            merged.push(other.get(row))?;
        }
        Ok(merged)
    }
}

/// A typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Utf8(Vec<String>),
    Date32(Vec<NaiveDate>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Bool(Vec<bool>),
    Dict8(DictColumn),
    Float64(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Utf8(v) => v.len(),
            Column::Date32(v) => v.len(),
            Column::Int8(v) => v.len(),
            Column::Int16(v) => v.len(),
            Column::Int32(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Dict8(v) => v.len(),
            Column::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The contract type this column carries.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Utf8(_) => ColumnType::Utf8,
            Column::Date32(_) => ColumnType::Date32,
            Column::Int8(_) => ColumnType::Int8,
            Column::Int16(_) => ColumnType::Int16,
            Column::Int32(_) => ColumnType::Int32,
            Column::Int64(_) => ColumnType::Int64,
            Column::Bool(_) => ColumnType::Bool,
            Column::Dict8(_) => ColumnType::Dict8,
            Column::Float64(_) => ColumnType::Float64,
        }
    }

    pub fn int_at(&self, row: usize) -> Option<i64> {
        match self {
            Column::Int8(v) => v.get(row).map(|x| *x as i64),
            Column::Int16(v) => v.get(row).map(|x| *x as i64),
            Column::Int32(v) => v.get(row).map(|x| *x as i64),
            Column::Int64(v) => v.get(row).copied(),
            _ => None,
        }
    }

    pub fn str_at(&self, row: usize) -> Option<&str> {
        match self {
            Column::Utf8(v) => v.get(row).map(|s| s.as_str()),
            Column::Dict8(v) => v.get(row),
            _ => None,
        }
    }

    pub fn bool_at(&self, row: usize) -> Option<bool> {
        match self {
            Column::Bool(v) => v.get(row).copied(),
            _ => None,
        }
    }

    pub fn float_at(&self, row: usize) -> Option<f64> {
        match self {
            Column::Float64(v) => v.get(row).copied(),
            _ => None,
        }
    }

    pub fn date_at(&self, row: usize) -> Option<NaiveDate> {
        match self {
            Column::Date32(v) => v.get(row).copied(),
            _ => None,
        }
    }

    /// Gathers the cells at the given row indices into a new column.
    pub(crate) fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Utf8(v) => Column::Utf8(rows.iter().map(|&r| v[r].clone()).collect()),
            Column::Date32(v) => Column::Date32(rows.iter().map(|&r| v[r]).collect()),
            Column::Int8(v) => Column::Int8(rows.iter().map(|&r| v[r]).collect()),
            Column::Int16(v) => Column::Int16(rows.iter().map(|&r| v[r]).collect()),
            Column::Int32(v) => Column::Int32(rows.iter().map(|&r| v[r]).collect()),
            Column::Int64(v) => Column::Int64(rows.iter().map(|&r| v[r]).collect()),
            Column::Bool(v) => Column::Bool(rows.iter().map(|&r| v[r]).collect()),
            Column::Dict8(v) => {
                // A row subset never widens the value list, so the codes can
                // be gathered as-is against the shared dictionary.
                Column::Dict8(DictColumn {
                    codes: rows.iter().map(|&r| v.codes[r]).collect(),
                    values: v.values.clone(),
                })
            }
            Column::Float64(v) => Column::Float64(rows.iter().map(|&r| v[r]).collect()),
        }
    }

    pub(crate) fn concat(&self, other: &Column) -> SchemaResult<Column> {
        match (self, other) {
            (Column::Utf8(a), Column::Utf8(b)) => {
                Ok(Column::Utf8(a.iter().chain(b.iter()).cloned().collect()))
            }
            (Column::Date32(a), Column::Date32(b)) => {
                Ok(Column::Date32(a.iter().chain(b.iter()).copied().collect()))
            }
            (Column::Int8(a), Column::Int8(b)) => {
                Ok(Column::Int8(a.iter().chain(b.iter()).copied().collect()))
            }
            (Column::Int16(a), Column::Int16(b)) => {
                Ok(Column::Int16(a.iter().chain(b.iter()).copied().collect()))
            }
            (Column::Int32(a), Column::Int32(b)) => {
                Ok(Column::Int32(a.iter().chain(b.iter()).copied().collect()))
            }
            (Column::Int64(a), Column::Int64(b)) => {
                Ok(Column::Int64(a.iter().chain(b.iter()).copied().collect()))
            }
            (Column::Bool(a), Column::Bool(b)) => {
                Ok(Column::Bool(a.iter().chain(b.iter()).copied().collect()))
            }
            (Column::Dict8(a), Column::Dict8(b)) => Ok(Column::Dict8(a.concat(b)?)),
            (Column::Float64(a), Column::Float64(b)) => {
                Ok(Column::Float64(a.iter().chain(b.iter()).copied().collect()))
            }
            (a, b) => Err(SchemaError::type_mismatch(
                "<concat>",
                a.column_type(),
                b.column_type(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_interning() {
        let mut col = DictColumn::new();
        col.push(Some("bowled")).unwrap();
        col.push(None).unwrap();
        col.push(Some("caught")).unwrap();
        col.push(Some("bowled")).unwrap();

        assert_eq!(col.len(), 4);
        assert_eq!(col.values().len(), 2);
        assert_eq!(col.get(0), Some("bowled"));
        assert_eq!(col.get(1), None);
        assert_eq!(col.get(3), Some("bowled"));
        assert_eq!(col.codes()[0], col.codes()[3]);
    }

    #[test]
    fn test_dict_concat_reinterns() {
        let mut a = DictColumn::new();
        a.push(Some("caught")).unwrap();
        let mut b = DictColumn::new();
        b.push(Some("lbw")).unwrap();
        b.push(Some("caught")).unwrap();

        let merged = a.concat(&b).unwrap();
        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(2), Some("caught"));
        assert_eq!(merged.values().len(), 2);
    }

    #[test]
    fn test_dict_code_space_capped() {
        let mut col = DictColumn::new();
        for i in 0..256 {
            col.push(Some(&format!("m{}", i))).unwrap();
        }
        // A 257th distinct value is rejected rather than relabeled.
        let err = col.push(Some("m256")).unwrap_err();
        assert_eq!(err.code().code(), "PITCH_SCHEMA_DICT_FULL");
        assert_eq!(col.len(), 256);
        assert_eq!(col.get(0), Some("m0"));
        assert_eq!(col.get(255), Some("m255"));

        // Known values still intern after the dictionary fills up.
        col.push(Some("m42")).unwrap();
        assert_eq!(col.get(256), Some("m42"));
    }

    #[test]
    fn test_widened_int_access() {
        assert_eq!(Column::Int8(vec![4]).int_at(0), Some(4));
        assert_eq!(Column::Int16(vec![300]).int_at(0), Some(300));
        assert_eq!(Column::Int32(vec![70000]).int_at(0), Some(70000));
        assert_eq!(Column::Utf8(vec!["x".into()]).int_at(0), None);
    }

    #[test]
    fn test_concat_type_mismatch() {
        let a = Column::Int8(vec![1]);
        let b = Column::Int32(vec![1]);
        assert!(a.concat(&b).is_err());
    }
}
