//! Column sort with header-click toggling.

use std::cmp::Ordering;

use serde::Serialize;

use crate::data::{Record, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn by(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: Some(column.into()),
            direction,
        }
    }

    /// Selecting the current column flips direction; a new column starts ascending.
    pub fn toggle(&mut self, column: &str) {
        if self.column.as_deref() == Some(column) {
            self.direction = self.direction.flipped();
        } else {
            self.column = Some(column.to_string());
            self.direction = SortDirection::Asc;
        }
    }
}

/// Reorders `rows` (positions into `records`) according to `spec`. Without a
/// column the order is left untouched. Ties keep their incoming order.
pub fn sort_rows(records: &[Record], rows: &mut [usize], spec: &SortSpec) {
    let Some(column) = spec.column.as_deref() else {
        return;
    };
    rows.sort_by(|&a, &b| {
        let left = records.get(a).and_then(|r| r.get(column));
        let right = records.get(b).and_then(|r| r.get(column));
        spec.direction.apply(compare_values(left, right))
    });
}

/// Numbers compare numerically; any other pairing compares case-folded text.
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.total_cmp(b),
        _ => collate(&display_key(left), &display_key(right)),
    }
}

fn display_key(value: Option<&Value>) -> String {
    value.map(Value::as_match_text).unwrap_or_default().to_lowercase()
}

// Both sides are already case-folded; spaces and punctuation sort before
// letters, so "new york" < "newark".
fn collate(left: &str, right: &str) -> Ordering {
    left.cmp(right)
}
