//! Record, dataset and scalar value model shared by every pipeline stage.
//!
//! Records are flat, ordered key → scalar maps. Two numeric extraction
//! policies live here because the chart and statistics stages disagree on
//! how malformed values count:
//!
//! - [`coerce_or_zero`] turns anything non-numeric into `0.0` (chart series).
//! - [`coerce_or_exclude`] drops anything that is not a finite number (summary
//!   statistics).

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Serialize, Serializer, ser::SerializeMap};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Null,
}

impl Value {
    /// Classifies a raw CSV cell: numeric literals become numbers, everything
    /// else (including the empty string) stays text.
    pub fn from_cell(raw: &str) -> Self {
        if raw.is_empty() {
            return Value::Text(String::new());
        }
        match parse_numeric_literal(raw) {
            Some(number) => Value::Number(number),
            None => Value::Text(raw.to_string()),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
            Value::Null => String::new(),
        }
    }

    /// String form used for searching, grouping and ordering. Unlike
    /// [`Value::as_display`], null spells out as `null`.
    pub fn as_match_text(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            other => other.as_display(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Zero, NaN, empty text and null are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Text(s) => !s.is_empty(),
            Value::Null => false,
        }
    }

    /// Null and empty text count as missing for completeness reporting.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.is_empty(),
            Value::Number(_) => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Number(n) => serialize_number(n, serializer),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Null => serializer.serialize_unit(),
        }
    }
}

/// Writes integral values as JSON integers so `17.0` renders as `17`.
pub(crate) fn serialize_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match json_number(*value) {
        serde_json::Value::Number(n) => n.serialize(serializer),
        _ => serializer.serialize_unit(),
    }
}

/// Integral values become JSON integers; non-finite values become `null`.
pub(crate) fn json_number(value: f64) -> serde_json::Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        serde_json::Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1.0e21 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn numeric_literal() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
            .expect("numeric literal pattern is valid")
    })
}

/// Parses a decimal literal: optional sign, digits with an optional fraction
/// (or a bare `.5` fraction), optional exponent. Surrounding whitespace is
/// ignored. Hex, `Infinity`, `NaN` and values that overflow to infinity are
/// rejected.
pub fn parse_numeric_literal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !numeric_literal().is_match(trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Chart policy: anything that is not a usable number becomes `0.0`.
pub fn coerce_or_zero(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) if n.is_finite() => *n,
        Some(Value::Text(s)) => parse_numeric_literal(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Statistics policy: only finite numbers (or numeric text) survive.
pub fn coerce_or_exclude(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) if n.is_finite() => Some(*n),
        Some(Value::Text(s)) => parse_numeric_literal(s),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field; an existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// A named, fully-loaded record set. Replaced wholesale on every load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub name: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
