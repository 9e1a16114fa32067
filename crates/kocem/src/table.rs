//! In-memory tabular data.
//!
//! Every reader in [`crate::formats`] produces a [`Table`] and every writer
//! consumes one, so quiz generation and conversion never care about the
//! on-disk format.

use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// No value.
    #[default]
    Empty,
    /// Text.
    Text(String),
    /// A number. Integers are stored as whole floats.
    Number(f64),
    /// A boolean.
    Bool(bool),
}

impl Cell {
    /// Whether the cell is empty or whitespace-only text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(_) | Self::Bool(_) => false,
        }
    }

    /// The cell as text, or `None` when blank.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        if self.is_blank() {
            None
        } else {
            Some(self.to_string())
        }
    }

    /// The cell as a number, parsing text when needed.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Bool(_) | Self::Empty => None,
        }
    }

    /// Convert to a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            Self::Bool(b) => Value::Bool(*b),
        }
    }

    /// Convert from a JSON value. Nested values are kept as JSON text.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(Self::Empty, Self::Number),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Text(value.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => f.write_str(s),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A named record: ordered column/value pairs.
pub type Record = Vec<(String, Cell)>;

/// A rectangular table with named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create an empty table with the given columns.
    #[must_use]
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a table from records. Column order is first appearance.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for (name, _) in record {
                if !columns.contains(name) {
                    columns.push(name.clone());
                }
            }
        }

        let mut table = Self::new(columns);
        for record in records {
            let mut row = vec![Cell::Empty; table.columns.len()];
            for (name, cell) in record {
                if let Some(idx) = table.columns.iter().position(|c| *c == name) {
                    row[idx] = cell;
                }
            }
            table.rows.push(row);
        }
        table
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, padding with empty cells or truncating to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Index of a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| Error::column_not_found(name, &self.columns))
    }

    /// All values of a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if no column has that name.
    pub fn column(&self, name: &str) -> Result<Vec<&Cell>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Rows as named records.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| self.columns.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Append another table's rows, adding any columns this table lacks.
    pub fn concat(&mut self, other: Table) {
        for column in &other.columns {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
                for row in &mut self.rows {
                    row.push(Cell::Empty);
                }
            }
        }

        let mapping: Vec<usize> = other
            .columns
            .iter()
            .filter_map(|c| self.columns.iter().position(|own| own == c))
            .collect();

        for other_row in other.rows {
            let mut row = vec![Cell::Empty; self.columns.len()];
            for (cell, &idx) in other_row.into_iter().zip(&mapping) {
                row[idx] = cell;
            }
            self.rows.push(row);
        }
    }

    /// Drop rows identical to an earlier row. Returns how many were removed.
    pub fn dedupe(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| seen.insert(row_hash(row)));
        before - self.rows.len()
    }
}

/// BLAKE3 hash identifying a row's content.
#[must_use]
pub fn row_hash(row: &[Cell]) -> String {
    let mut hasher = blake3::Hasher::new();
    for cell in row {
        let tag: &[u8] = match cell {
            Cell::Empty => b"e",
            Cell::Text(_) => b"t",
            Cell::Number(_) => b"n",
            Cell::Bool(_) => b"b",
        };
        hasher.update(tag);
        hasher.update(cell.to_string().as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize().to_hex().to_string()
}
