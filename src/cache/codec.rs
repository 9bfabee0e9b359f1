//! Columnar table codec
//!
//! Compact length-prefixed binary layout for cached tables:
//!
//! ```text
//! +------------------+
//! | Column count     | (u32 LE)
//! +------------------+  per column:
//! | Name             | (length-prefixed string)
//! | Type tag         | (u8)
//! | Row count        | (u32 LE)
//! | Values           | (fixed-width, or length-prefixed for strings)
//! +------------------+
//! ```
//!
//! Dictionary columns store the distinct-value list first, then one
//! (presence, code) byte pair per row. All integers are little-endian.

use chrono::{Datelike, NaiveDate};

use crate::table::{Column, DictColumn, Table};

use super::errors::{CacheError, CacheResult};

const TAG_UTF8: u8 = 0;
const TAG_DATE32: u8 = 1;
const TAG_INT8: u8 = 2;
const TAG_INT16: u8 = 3;
const TAG_INT32: u8 = 4;
const TAG_INT64: u8 = 5;
const TAG_BOOL: u8 = 6;
const TAG_DICT8: u8 = 7;
const TAG_FLOAT64: u8 = 8;

pub fn encode_table(table: &Table) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 * table.num_columns().max(1));
    buf.extend_from_slice(&(table.num_columns() as u32).to_le_bytes());
    for (name, column) in table.columns() {
        put_str(&mut buf, name);
        encode_column(&mut buf, column);
    }
    buf
}

pub fn decode_table(data: &[u8]) -> CacheResult<Table> {
    let mut cursor = Cursor::new(data);
    let num_columns = cursor.take_u32()? as usize;
    let mut columns = Vec::with_capacity(num_columns);
    for _ in 0..num_columns {
        let name = cursor.take_str()?;
        let column = decode_column(&mut cursor)?;
        columns.push((name, column));
    }
    Table::new(columns).map_err(|e| CacheError::codec(e.to_string()))
}

fn encode_column(buf: &mut Vec<u8>, column: &Column) {
    match column {
        Column::Utf8(values) => {
            put_header(buf, TAG_UTF8, values.len());
            for v in values {
                put_str(buf, v);
            }
        }
        Column::Date32(values) => {
            put_header(buf, TAG_DATE32, values.len());
            for v in values {
                buf.extend_from_slice(&v.num_days_from_ce().to_le_bytes());
            }
        }
        Column::Int8(values) => {
            put_header(buf, TAG_INT8, values.len());
            for v in values {
                buf.push(*v as u8);
            }
        }
        Column::Int16(values) => {
            put_header(buf, TAG_INT16, values.len());
            for v in values {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        Column::Int32(values) => {
            put_header(buf, TAG_INT32, values.len());
            for v in values {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        Column::Int64(values) => {
            put_header(buf, TAG_INT64, values.len());
            for v in values {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
        Column::Bool(values) => {
            put_header(buf, TAG_BOOL, values.len());
            for v in values {
                buf.push(u8::from(*v));
            }
        }
        Column::Dict8(dict) => {
            put_header(buf, TAG_DICT8, dict.len());
            buf.extend_from_slice(&(dict.values().len() as u32).to_le_bytes());
            for v in dict.values() {
                put_str(buf, v);
            }
            for code in dict.codes() {
                match code {
                    Some(c) => {
                        buf.push(1);
                        buf.push(*c);
                    }
                    None => {
                        buf.push(0);
                        buf.push(0);
                    }
                }
            }
        }
        Column::Float64(values) => {
            put_header(buf, TAG_FLOAT64, values.len());
            for v in values {
                buf.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
}

fn decode_column(cursor: &mut Cursor<'_>) -> CacheResult<Column> {
    let tag = cursor.take_u8()?;
    let rows = cursor.take_u32()? as usize;
    match tag {
        TAG_UTF8 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(cursor.take_str()?);
            }
            Ok(Column::Utf8(values))
        }
        TAG_DATE32 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                let days = cursor.take_i32()?;
                let date = NaiveDate::from_num_days_from_ce_opt(days)
                    .ok_or_else(|| CacheError::codec("date out of range"))?;
                values.push(date);
            }
            Ok(Column::Date32(values))
        }
        TAG_INT8 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(cursor.take_u8()? as i8);
            }
            Ok(Column::Int8(values))
        }
        TAG_INT16 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(i16::from_le_bytes(cursor.take_array::<2>()?));
            }
            Ok(Column::Int16(values))
        }
        TAG_INT32 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(cursor.take_i32()?);
            }
            Ok(Column::Int32(values))
        }
        TAG_INT64 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(i64::from_le_bytes(cursor.take_array::<8>()?));
            }
            Ok(Column::Int64(values))
        }
        TAG_BOOL => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(cursor.take_u8()? != 0);
            }
            Ok(Column::Bool(values))
        }
        TAG_DICT8 => {
            let distinct = cursor.take_u32()? as usize;
            let mut values = Vec::with_capacity(distinct);
            for _ in 0..distinct {
                values.push(cursor.take_str()?);
            }
            let mut dict = DictColumn::new();
            for _ in 0..rows {
                let present = cursor.take_u8()? != 0;
                let code = cursor.take_u8()? as usize;
                let cell = if present {
                    Some(
                        values
                            .get(code)
                            .ok_or_else(|| CacheError::codec("dictionary code out of range"))?
                            .as_str(),
                    )
                } else {
                    None
                };
                dict.push(cell)
                    .map_err(|e| CacheError::codec(e.to_string()))?;
            }
            Ok(Column::Dict8(dict))
        }
        TAG_FLOAT64 => {
            let mut values = Vec::with_capacity(rows);
            for _ in 0..rows {
                values.push(f64::from_le_bytes(cursor.take_array::<8>()?));
            }
            Ok(Column::Float64(values))
        }
        other => Err(CacheError::codec(format!("unknown column tag {}", other))),
    }
}

fn put_header(buf: &mut Vec<u8>, tag: u8, rows: usize) {
    buf.push(tag);
    buf.extend_from_slice(&(rows as u32).to_le_bytes());
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> CacheResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| CacheError::codec("truncated frame"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_u8(&mut self) -> CacheResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn take_array<const N: usize>(&mut self) -> CacheResult<[u8; N]> {
        let slice = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    fn take_u32(&mut self) -> CacheResult<u32> {
        Ok(u32::from_le_bytes(self.take_array::<4>()?))
    }

    fn take_i32(&mut self) -> CacheResult<i32> {
        Ok(i32::from_le_bytes(self.take_array::<4>()?))
    }

    fn take_str(&mut self) -> CacheResult<String> {
        let len = self.take_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CacheError::codec("invalid utf8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_table() -> Table {
        let mut dict = DictColumn::new();
        dict.push(Some("Powerplay")).unwrap();
        dict.push(None).unwrap();
        dict.push(Some("Death")).unwrap();
        Table::new(vec![
            (
                "match_id".into(),
                Column::Utf8(vec!["m1".into(), "m1".into(), "m2".into()]),
            ),
            (
                "date".into(),
                Column::Date32(vec![
                    NaiveDate::from_ymd_opt(2023, 5, 21).unwrap();
                    3
                ]),
            ),
            ("runs".into(), Column::Int8(vec![4, 0, -1])),
            ("totals".into(), Column::Int64(vec![180, 165, 201])),
            ("out".into(), Column::Bool(vec![false, true, false])),
            ("phase".into(), Column::Dict8(dict)),
            ("sr".into(), Column::Float64(vec![133.0, 0.0, 250.5])),
        ])
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_all_column_types() {
        let table = mixed_table();
        let decoded = decode_table(&encode_table(&table)).unwrap();
        assert_eq!(decoded, table);
        assert_eq!(decoded.str_at("phase", 1), None);
        assert_eq!(decoded.str_at("phase", 2), Some("Death"));
    }

    #[test]
    fn test_truncated_frame_is_codec_error() {
        let bytes = encode_table(&mixed_table());
        let err = decode_table(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(err.to_string().contains("PITCH_CACHE_CODEC"));
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(vec![]).unwrap();
        let decoded = decode_table(&encode_table(&table)).unwrap();
        assert_eq!(decoded.num_columns(), 0);
    }
}
