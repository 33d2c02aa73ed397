//! Survey Dataset Model

use crate::error::DatasetError;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Scalar cell value of a survey column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Numeric value (integer codes are stored as whole floats)
    Number(f64),
    /// Text or category name
    Text(String),
}

impl Value {
    /// Whether the cell is missing
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Number(n) => n.is_nan(),
            Value::Text(_) => false,
        }
    }

    /// Borrow the text payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical category name (`3.0` becomes `"3"`), `None` for missing cells
    pub fn category_label(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Number(n) if n.is_nan() => None,
            Value::Number(n) => Some(format_number(*n)),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category_label() {
            Some(label) => f.write_str(&label),
            None => Ok(()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Named column of cell values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from anything convertible to cell values
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered collection of named, row-aligned columns
///
/// Column names are not required to be unique until [`Dataset::dedup_columns`]
/// runs; lookups by name always resolve to the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetRepr")]
pub struct Dataset {
    columns: Vec<Column>,
}

/// Unchecked wire form, validated through [`Dataset::from_columns`]
#[derive(Deserialize)]
struct DatasetRepr {
    columns: Vec<Column>,
}

impl TryFrom<DatasetRepr> for Dataset {
    type Error = DatasetError;

    fn try_from(repr: DatasetRepr) -> Result<Self, Self::Error> {
        Self::from_columns(repr.columns)
    }
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset, rejecting columns of differing length
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, DatasetError> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(DatasetError::RowCountMismatch {
                    column: bad.name.clone(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Number of rows shared by every column
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns, duplicates included
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// All columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// First column with the given name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Whether a column with the given name exists
    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Whether any column name appears more than once
    pub fn has_duplicate_columns(&self) -> bool {
        self.columns
            .iter()
            .enumerate()
            .any(|(i, c)| self.columns[..i].iter().any(|p| p.name == c.name))
    }

    /// Drop every repeated column name, keeping the first occurrence.
    ///
    /// Returns the number of columns dropped.
    pub fn dedup_columns(&mut self) -> usize {
        let before = self.columns.len();
        let mut seen: Vec<String> = Vec::with_capacity(before);
        self.columns.retain(|c| {
            if seen.contains(&c.name) {
                false
            } else {
                seen.push(c.name.clone());
                true
            }
        });

        let dropped = before - self.columns.len();
        if dropped > 0 {
            debug!("Dropped {} duplicate column(s)", dropped);
        }
        dropped
    }

    /// Append a column, replacing any existing columns of the same name.
    ///
    /// The dataset is left untouched when the column length does not match.
    pub fn set_column(&mut self, column: Column) -> Result<(), DatasetError> {
        let expected = self
            .columns
            .iter()
            .find(|c| c.name != column.name)
            .map(Column::len);
        if let Some(expected) = expected {
            if column.len() != expected {
                return Err(DatasetError::RowCountMismatch {
                    expected,
                    actual: column.len(),
                    column: column.name,
                });
            }
        }

        self.columns.retain(|c| c.name != column.name);
        self.columns.push(column);
        Ok(())
    }

    /// Project the dataset onto the named columns, in the given order
    pub fn select(&self, names: &[&str]) -> Result<Dataset, DatasetError> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name)
                    .cloned()
                    .ok_or_else(|| DatasetError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }
}
