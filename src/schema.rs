//! Column discovery and type inference.
//!
//! The column list is the key order of the first record, and each column's
//! type is decided from that record's value alone. Later rows are never
//! consulted; downstream stages coerce defensively instead.

use std::fmt;

use serde::Serialize;

use crate::data::{Dataset, Record, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::String => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub columns: Vec<ColumnDescriptor>,
}

impl Schema {
    pub fn infer(dataset: &Dataset) -> Self {
        Self::from_records(&dataset.records)
    }

    pub fn from_records(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return Schema::default();
        };
        let columns = first
            .iter()
            .map(|(name, value)| ColumnDescriptor {
                name: name.to_string(),
                column_type: type_of_first_value(Some(value)),
            })
            .collect();
        Schema { columns }
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Unknown columns report `String`, same as a missing first-row value.
    pub fn column_type(&self, name: &str) -> ColumnType {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.column_type)
            .unwrap_or(ColumnType::String)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| c.column_type == ColumnType::Number)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// A falsy first value (missing, null, "", 0) reads as a string column.
fn type_of_first_value(value: Option<&Value>) -> ColumnType {
    match value {
        Some(v @ Value::Number(_)) if v.is_truthy() => ColumnType::Number,
        _ => ColumnType::String,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AxisSelection {
    pub x: Option<String>,
    pub y: Option<String>,
}

impl AxisSelection {
    pub fn new(x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            x: Some(x.into()),
            y: Some(y.into()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

/// Picks starting axes from the first record's runtime value kinds: X is the
/// first text column (else the first column), Y the first numeric column
/// (else the second column).
pub fn default_axes(records: &[Record]) -> AxisSelection {
    let Some(first) = records.first() else {
        return AxisSelection::default();
    };
    let names = first.keys().collect::<Vec<_>>();
    let x = first
        .iter()
        .find(|(_, value)| matches!(value, Value::Text(_)))
        .map(|(name, _)| name)
        .or_else(|| names.first().copied());
    let y = first
        .iter()
        .find(|(_, value)| value.is_number())
        .map(|(name, _)| name)
        .or_else(|| names.get(1).copied());
    AxisSelection {
        x: x.map(str::to_string),
        y: y.map(str::to_string),
    }
}
