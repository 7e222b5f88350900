// src/domain/table.rs

use crate::domain::listing::ListingKind;
use crate::domain::schema::{Column, ColumnType};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;

/// A single scalar in a listing table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Cell {
    /// Loose conversion straight from the payload, before any column typing.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::String(s) => Cell::Text(s.clone()),
            Value::Bool(b) => Cell::Text(b.to_string()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            other => Cell::Text(other.to_string()),
        }
    }

    /// Coerce to `ty`. Anything that doesn't parse becomes `Null`; this never fails.
    pub fn coerce(self, ty: ColumnType) -> Cell {
        match ty {
            ColumnType::Text => match self {
                Cell::Int(i) => Cell::Text(i.to_string()),
                Cell::Float(f) => Cell::Text(f.to_string()),
                other => other,
            },
            ColumnType::Int => match self {
                Cell::Int(i) => Cell::Int(i),
                Cell::Float(f) => float_to_int(f).map(Cell::Int).unwrap_or(Cell::Null),
                Cell::Text(s) => parse_int(&s).map(Cell::Int).unwrap_or(Cell::Null),
                Cell::Null => Cell::Null,
            },
            ColumnType::Float => match self {
                Cell::Float(f) if f.is_finite() => Cell::Float(f),
                Cell::Int(i) => Cell::Float(i as f64),
                Cell::Text(s) => parse_float(&s).map(Cell::Float).unwrap_or(Cell::Null),
                _ => Cell::Null,
            },
        }
    }
}

#[cfg(test)]
impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }
}

fn float_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_float(s).and_then(float_to_int))
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// One row. Always exactly as wide as its kind's column list.
pub type ListingRecord = Vec<Cell>;

/// Ordered rows for one listing kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingTable {
    kind: ListingKind,
    rows: Vec<ListingRecord>,
}

impl ListingTable {
    pub fn empty(kind: ListingKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
        }
    }

    /// Rows narrower than the schema are padded with `Null`; extra cells are dropped.
    pub fn from_records(kind: ListingKind, records: Vec<ListingRecord>) -> Self {
        let width = kind.columns().len();
        let rows = records
            .into_iter()
            .map(|mut r| {
                r.resize(width, Cell::Null);
                r
            })
            .collect();
        Self { kind, rows }
    }

    pub fn kind(&self) -> ListingKind {
        self.kind
    }

    pub fn columns(&self) -> &'static [Column] {
        self.kind.columns()
    }

    pub fn rows(&self) -> &[ListingRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append `other`'s rows after ours. Tables of another kind are ignored.
    pub fn append(&mut self, other: ListingTable) {
        if other.kind == self.kind {
            self.rows.extend(other.rows);
        }
    }

    /// Concatenate in iteration order.
    pub fn concat<I>(kind: ListingKind, tables: I) -> Self
    where
        I: IntoIterator<Item = ListingTable>,
    {
        let mut out = Self::empty(kind);
        for t in tables {
            out.append(t);
        }
        out
    }

    /// Cast every cell to its column's declared type.
    pub fn normalize(self) -> Self {
        let columns = self.kind.columns();
        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(columns)
                    .map(|(cell, col)| cell.coerce(col.ty))
                    .collect()
            })
            .collect();
        Self {
            kind: self.kind,
            rows,
        }
    }
}

#[cfg(test)]
impl ListingTable {
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.columns().iter().position(|c| c.name == column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }
}

/// Serialises as a JSON array of `{column: value}` objects.
impl Serialize for ListingTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Row<'a>(&'a [Column], &'a [Cell]);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (col, cell) in self.0.iter().zip(self.1) {
                    map.serialize_entry(col.name, cell)?;
                }
                map.end()
            }
        }

        let columns = self.columns();
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Row(columns, row))?;
        }
        seq.end()
    }
}
