//! Aggregation engine: reshapes the current view into chart-ready series.
//!
//! Each chart kind has its own shape:
//!
//! - **bar / line / area**: one point per distinct X value carrying the mean
//!   of Y (`coerce_or_zero`) under the Y column name and the sum under `total`.
//!   Groups appear in first-seen order.
//! - **pie**: occurrence count per distinct X value, largest first, with the
//!   tail beyond the slice limit folded into a single `Others` slice.
//! - **scatter**: one point per record with a best-effort label.

use std::collections::HashMap;

use clap::ValueEnum;
use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::{
    data::{Record, coerce_or_zero, format_number, json_number, serialize_number},
    schema::AxisSelection,
};

pub const OTHERS_LABEL: &str = "Others";
pub const DEFAULT_PIE_SLICES: usize = 10;
pub const TOTAL_FIELD: &str = "total";
const LABEL_FIELDS: [&str; 3] = ["title", "company", "city"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    #[default]
    Area,
    Pie,
    Scatter,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub axes: AxisSelection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupPoint {
    pub label: String,
    pub average: f64,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieSlice {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    #[serde(serialize_with = "serialize_number")]
    pub x: f64,
    #[serde(serialize_with = "serialize_number")]
    pub y: f64,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ChartSeries {
    /// An axis is unset or the view has no rows.
    #[default]
    Empty,
    Grouped {
        x_column: String,
        y_column: String,
        points: Vec<GroupPoint>,
    },
    Pie(Vec<PieSlice>),
    Scatter(Vec<ScatterPoint>),
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        match self {
            ChartSeries::Empty => 0,
            ChartSeries::Grouped { points, .. } => points.len(),
            ChartSeries::Pie(slices) => slices.len(),
            ChartSeries::Scatter(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the series as the JSON array handed to the chart renderer.
    ///
    /// Grouped points are keyed by the axis column names, so an X or Y column
    /// named `total` overwrites in place rather than producing duplicate keys.
    pub fn to_json(&self) -> serde_json::Value {
        let items = match self {
            ChartSeries::Empty => Vec::new(),
            ChartSeries::Grouped {
                x_column,
                y_column,
                points,
            } => points
                .iter()
                .map(|point| {
                    let mut entry = serde_json::Map::new();
                    entry.insert(
                        x_column.clone(),
                        serde_json::Value::String(point.label.clone()),
                    );
                    entry.insert(y_column.clone(), json_number(point.average));
                    entry.insert(TOTAL_FIELD.to_string(), json_number(point.total));
                    serde_json::Value::Object(entry)
                })
                .collect(),
            ChartSeries::Pie(slices) => slices
                .iter()
                .map(|slice| serde_json::json!({ "name": slice.name, "value": slice.value }))
                .collect(),
            ChartSeries::Scatter(points) => points
                .iter()
                .map(|point| {
                    serde_json::json!({
                        "x": json_number(point.x),
                        "y": json_number(point.y),
                        "name": point.name,
                    })
                })
                .collect(),
        };
        serde_json::Value::Array(items)
    }

    /// Headers and rows for a plain-text rendering of the series.
    pub fn table(&self) -> (Vec<String>, Vec<Vec<String>>) {
        match self {
            ChartSeries::Empty => (Vec::new(), Vec::new()),
            ChartSeries::Grouped {
                x_column,
                y_column,
                points,
            } => (
                vec![
                    x_column.clone(),
                    format!("avg({y_column})"),
                    format!("{TOTAL_FIELD}({y_column})"),
                    "count".to_string(),
                ],
                points
                    .iter()
                    .map(|point| {
                        vec![
                            point.label.clone(),
                            format_number(point.average),
                            format_number(point.total),
                            point.count.to_string(),
                        ]
                    })
                    .collect(),
            ),
            ChartSeries::Pie(slices) => (
                vec!["name".to_string(), "value".to_string()],
                slices
                    .iter()
                    .map(|slice| vec![slice.name.clone(), slice.value.to_string()])
                    .collect(),
            ),
            ChartSeries::Scatter(points) => (
                vec!["name".to_string(), "x".to_string(), "y".to_string()],
                points
                    .iter()
                    .map(|point| {
                        vec![
                            point.name.clone(),
                            format_number(point.x),
                            format_number(point.y),
                        ]
                    })
                    .collect(),
            ),
        }
    }
}

impl Serialize for ChartSeries {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

/// Builds the series for `spec` over the view rows.
pub fn aggregate(rows: &[&Record], spec: &ChartSpec, pie_slices: usize) -> ChartSeries {
    let (Some(x), Some(y)) = (spec.axes.x.as_deref(), spec.axes.y.as_deref()) else {
        return ChartSeries::Empty;
    };
    if rows.is_empty() {
        return ChartSeries::Empty;
    }
    match spec.kind {
        ChartKind::Bar | ChartKind::Line | ChartKind::Area => ChartSeries::Grouped {
            x_column: x.to_string(),
            y_column: y.to_string(),
            points: group_points(rows, x, y),
        },
        ChartKind::Pie => ChartSeries::Pie(pie_slices_for(rows, x, pie_slices)),
        ChartKind::Scatter => ChartSeries::Scatter(scatter_points(rows, x, y)),
    }
}

fn group_key(record: &Record, column: &str) -> String {
    record
        .get(column)
        .map(|value| value.as_match_text())
        .unwrap_or_default()
}

pub fn group_points(rows: &[&Record], x: &str, y: &str) -> Vec<GroupPoint> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut points: Vec<GroupPoint> = Vec::new();
    for record in rows {
        let label = group_key(record, x);
        let value = coerce_or_zero(record.get(y));
        let slot = *positions.entry(label.clone()).or_insert_with(|| {
            points.push(GroupPoint {
                label,
                average: 0.0,
                total: 0.0,
                count: 0,
            });
            points.len() - 1
        });
        let point = &mut points[slot];
        point.total += value;
        point.count += 1;
    }
    for point in &mut points {
        point.average = point.total / point.count as f64;
    }
    points
}

/// Frequency of each X value, largest first; ties keep discovery order.
pub fn pie_slices_for(rows: &[&Record], x: &str, limit: usize) -> Vec<PieSlice> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<PieSlice> = Vec::new();
    for record in rows {
        let name = group_key(record, x);
        let slot = *positions.entry(name.clone()).or_insert_with(|| {
            counts.push(PieSlice { name, value: 0 });
            counts.len() - 1
        });
        counts[slot].value += 1;
    }
    let mut slices = counts
        .into_iter()
        .sorted_by(|a, b| b.value.cmp(&a.value))
        .collect::<Vec<_>>();
    if slices.len() > limit {
        let others = slices.split_off(limit);
        slices.push(PieSlice {
            name: OTHERS_LABEL.to_string(),
            value: others.iter().map(|slice| slice.value).sum(),
        });
    }
    slices
}

pub fn scatter_points(rows: &[&Record], x: &str, y: &str) -> Vec<ScatterPoint> {
    rows.iter()
        .enumerate()
        .map(|(idx, record)| ScatterPoint {
            x: coerce_or_zero(record.get(x)),
            y: coerce_or_zero(record.get(y)),
            name: point_label(record, idx + 1),
        })
        .collect()
}

/// First truthy `title`, `company` or `city`, else `Item <position>`.
pub fn point_label(record: &Record, position: usize) -> String {
    LABEL_FIELDS
        .iter()
        .filter_map(|field| record.get(field))
        .find(|value| value.is_truthy())
        .map(|value| value.as_display())
        .unwrap_or_else(|| format!("Item {position}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    #[test]
    fn point_label_skips_falsy_candidates() {
        let record: Record = [
            ("title", Value::Text(String::new())),
            ("company", Value::Number(0.0)),
            ("city", Value::Text("Agra".to_string())),
        ]
        .into_iter()
        .collect();
        assert_eq!(point_label(&record, 3), "Agra");
        assert_eq!(point_label(&Record::new(), 3), "Item 3");
    }

    #[test]
    fn grouped_json_overwrites_colliding_total_column() {
        let series = ChartSeries::Grouped {
            x_column: "region".to_string(),
            y_column: TOTAL_FIELD.to_string(),
            points: vec![GroupPoint {
                label: "north".to_string(),
                average: 2.5,
                total: 5.0,
                count: 2,
            }],
        };
        assert_eq!(
            series.to_json(),
            serde_json::json!([{ "region": "north", "total": 5 }])
        );
    }

    #[test]
    fn null_x_values_group_under_null() {
        let rows = [
            [("region", Value::Null), ("pop", Value::Number(4.0))],
            [("region", Value::Text(String::new())), ("pop", Value::Number(2.0))],
        ]
        .into_iter()
        .map(|fields| fields.into_iter().collect::<Record>())
        .collect::<Vec<_>>();
        let view = rows.iter().collect::<Vec<_>>();
        let labels = group_points(&view, "region", "pop")
            .into_iter()
            .map(|point| point.label)
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["null".to_string(), String::new()]);
    }
}

