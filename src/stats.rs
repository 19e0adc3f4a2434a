use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    data::{Record, coerce_or_exclude, format_number, serialize_number},
    schema::Schema,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    #[serde(skip)]
    pub column: String,
    #[serde(serialize_with = "serialize_number")]
    pub min: f64,
    #[serde(serialize_with = "serialize_number")]
    pub max: f64,
    #[serde(serialize_with = "serialize_number")]
    pub avg: f64,
    pub count: usize,
}

/// Per-column min/max/mean over the view, numeric columns only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryStatistics {
    pub columns: Vec<ColumnSummary>,
}

impl SummaryStatistics {
    pub fn get(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|summary| summary.column == column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.columns
            .iter()
            .map(|summary| {
                vec![
                    summary.column.clone(),
                    summary.count.to_string(),
                    format_metric(summary.min),
                    format_metric(summary.max),
                    format_metric(summary.avg),
                ]
            })
            .collect()
    }
}

impl Serialize for SummaryStatistics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for summary in &self.columns {
            map.serialize_entry(&summary.column, summary)?;
        }
        map.end()
    }
}

/// Summarizes every `number`-typed column of `schema` across `rows`.
///
/// Values that are not finite numbers are skipped rather than zero-filled,
/// and a column with nothing left to summarize is omitted.
pub fn summarize(schema: &Schema, rows: &[&Record]) -> SummaryStatistics {
    let mut columns = Vec::new();
    for descriptor in schema.numeric_columns() {
        let mut stats = ColumnStats::default();
        for record in rows {
            if let Some(value) = coerce_or_exclude(record.get(&descriptor.name)) {
                stats.add_value(value);
            }
        }
        if let Some(summary) = stats.finish(&descriptor.name) {
            columns.push(summary);
        }
    }
    SummaryStatistics { columns }
}

#[derive(Debug, Default)]
struct ColumnStats {
    sum: f64,
    count: usize,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    fn add_value(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = Some(match self.min {
            Some(current) => current.min(value),
            None => value,
        });
        self.max = Some(match self.max {
            Some(current) => current.max(value),
            None => value,
        });
    }

    fn finish(self, column: &str) -> Option<ColumnSummary> {
        let (min, max) = (self.min?, self.max?);
        Some(ColumnSummary {
            column: column.to_string(),
            min,
            max,
            avg: self.sum / self.count as f64,
            count: self.count,
        })
    }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format_number(value)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_stats_track_extremes_and_mean() {
        let mut stats = ColumnStats::default();
        for value in [4.0, -2.0, 10.0] {
            stats.add_value(value);
        }
        let summary = stats.finish("pop").expect("summary");
        assert_eq!(summary.min, -2.0);
        assert_eq!(summary.max, 10.0);
        assert_eq!(summary.avg, 4.0);
        assert_eq!(summary.count, 3);
    }

    #[test]
    fn empty_column_stats_produce_no_summary() {
        assert!(ColumnStats::default().finish("pop").is_none());
    }

    #[test]
    fn format_metric_rounds_fractions_to_two_places() {
        assert_eq!(format_metric(8.5), "8.50");
        assert_eq!(format_metric(17.0), "17");
    }
}
