//! Data insights over the current view: distinct counts, dominant values for
//! low-cardinality text columns, and overall completeness.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    data::{Record, Value},
    schema::{ColumnType, Schema},
};

/// Text columns with more distinct values than this get no top-value list.
pub const TOP_VALUES_MAX_DISTINCT: usize = 10;
pub const TOP_VALUES_SHOWN: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DataQuality {
    pub complete: usize,
    pub missing: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataInsights {
    pub total_records: usize,
    #[serde(serialize_with = "ordered_map")]
    pub unique_values: Vec<(String, usize)>,
    #[serde(serialize_with = "ordered_map")]
    pub top_values: Vec<(String, Vec<ValueCount>)>,
    pub data_quality: DataQuality,
}

impl DataInsights {
    pub fn unique_count(&self, column: &str) -> Option<usize> {
        self.unique_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, count)| *count)
    }

    pub fn top_values_for(&self, column: &str) -> Option<&[ValueCount]> {
        self.top_values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, values)| values.as_slice())
    }
}

fn ordered_map<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Returns `None` for an empty view.
pub fn compute(schema: &Schema, rows: &[&Record]) -> Option<DataInsights> {
    if rows.is_empty() {
        return None;
    }
    let mut insights = DataInsights {
        total_records: rows.len(),
        ..DataInsights::default()
    };
    for descriptor in &schema.columns {
        let present = rows
            .iter()
            .filter_map(|record| record.get(&descriptor.name))
            .filter(|value| !value.is_blank())
            .collect::<Vec<_>>();

        let distinct = present
            .iter()
            .map(|value| distinct_key(value))
            .collect::<HashSet<_>>()
            .len();
        insights
            .unique_values
            .push((descriptor.name.clone(), distinct));

        if descriptor.column_type == ColumnType::String && distinct <= TOP_VALUES_MAX_DISTINCT {
            insights
                .top_values
                .push((descriptor.name.clone(), top_values(&present)));
        }

        insights.data_quality.complete += present.len();
        insights.data_quality.missing += rows.len() - present.len();
    }
    Some(insights)
}

// Numbers and numeric-looking text stay distinct.
fn distinct_key(value: &Value) -> (bool, String) {
    (value.is_number(), value.as_display())
}

fn top_values(values: &[&Value]) -> Vec<ValueCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in values {
        let key = value.as_display();
        let count = counts.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            0
        });
        *count += 1;
    }
    order
        .into_iter()
        .map(|value| {
            let count = counts.get(&value).copied().unwrap_or_default();
            ValueCount { value, count }
        })
        .sorted_by(|a, b| b.count.cmp(&a.count))
        .take(TOP_VALUES_SHOWN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;

    fn record(region: Value, score: Value) -> Record {
        [("region", region), ("score", score)].into_iter().collect()
    }

    #[test]
    fn compute_counts_distinct_top_values_and_gaps() {
        let dataset = Dataset::new(
            "regions",
            vec![
                record(Value::Text("West".into()), Value::Number(4.0)),
                record(Value::Text("South".into()), Value::Number(4.0)),
                record(Value::Text("West".into()), Value::Null),
                record(Value::Text(String::new()), Value::Number(9.0)),
            ],
        );
        let schema = Schema::infer(&dataset);
        let rows = dataset.records.iter().collect::<Vec<_>>();
        let insights = compute(&schema, &rows).expect("non-empty view");

        assert_eq!(insights.total_records, 4);
        assert_eq!(insights.unique_count("region"), Some(2));
        assert_eq!(insights.unique_count("score"), Some(2));
        assert_eq!(
            insights.top_values_for("region"),
            Some(
                &[
                    ValueCount { value: "West".into(), count: 2 },
                    ValueCount { value: "South".into(), count: 1 },
                ][..]
            )
        );
        assert!(insights.top_values_for("score").is_none());
        assert_eq!(insights.data_quality, DataQuality { complete: 6, missing: 2 });
    }

    #[test]
    fn numeric_text_and_numbers_are_distinct_values() {
        let a = Value::Number(7.0);
        let b = Value::Text("7".into());
        assert_ne!(distinct_key(&a), distinct_key(&b));
    }

    #[test]
    fn empty_view_has_no_insights() {
        assert!(compute(&Schema::default(), &[]).is_none());
    }
}
