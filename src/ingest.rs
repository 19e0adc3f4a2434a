//! Ingestion normalizer: turns raw JSON or CSV text into a [`Dataset`].
//!
//! Both formats share the same all-or-nothing row ceiling. A load either
//! yields a complete record set or a [`LoadError`]; nothing is truncated.

use std::path::Path;

use encoding_rs::Encoding;
use log::debug;

use crate::{
    data::{Dataset, Record, Value},
    error::{LoadError, LoadResult},
    io_utils,
};

pub const DEFAULT_ROW_LIMIT: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Json,
    Csv,
}

impl FileKind {
    /// Resolves the input format from an optional MIME type, falling back to
    /// the file extension.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> LoadResult<Self> {
        if let Some(mime) = content_type {
            let essence = mime
                .split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            match essence.as_str() {
                "application/json" | "text/json" => return Ok(FileKind::Json),
                "text/csv" | "application/csv" => return Ok(FileKind::Csv),
                _ => {}
            }
        }
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(FileKind::Json),
            Some("csv") => Ok(FileKind::Csv),
            _ => Err(LoadError::UnsupportedType {
                file: file_name.to_string(),
            }),
        }
    }
}

/// Decodes and parses one input into a dataset named `name`.
pub fn load_bytes(
    name: &str,
    bytes: &[u8],
    kind: FileKind,
    encoding: &'static Encoding,
    row_limit: usize,
) -> LoadResult<Dataset> {
    let text = io_utils::decode_bytes(bytes, encoding)
        .map_err(|err| LoadError::format(format!("Error reading {name}: {err}")))?;
    let records = parse_records(kind, &text, row_limit)?;
    debug!("Parsed {} record(s) from {name}", records.len());
    Ok(Dataset::new(name, records))
}

pub fn parse_records(kind: FileKind, text: &str, row_limit: usize) -> LoadResult<Vec<Record>> {
    match kind {
        FileKind::Json => parse_json(text, row_limit),
        FileKind::Csv => parse_csv(text, row_limit),
    }
}

/// Parses a top-level JSON array of flat objects.
pub fn parse_json(text: &str, row_limit: usize) -> LoadResult<Vec<Record>> {
    let parsed: serde_json::Value = serde_json::from_str(text)
        .map_err(|err| LoadError::format(format!("Error reading JSON file: {err}")))?;
    let serde_json::Value::Array(items) = parsed else {
        return Err(LoadError::format(
            "Error reading JSON file: expected an array of objects",
        ));
    };
    if items.len() > row_limit {
        return Err(LoadError::SizeLimit {
            rows: items.len(),
            limit: row_limit,
        });
    }
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| json_record(idx, item))
        .collect()
}

fn json_record(idx: usize, item: serde_json::Value) -> LoadResult<Record> {
    let serde_json::Value::Object(fields) = item else {
        return Err(LoadError::format(format!(
            "Error reading JSON file: element {} is not an object",
            idx + 1
        )));
    };
    let mut record = Record::new();
    for (key, value) in fields {
        let scalar = match value {
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(number) => Value::Number(number),
                None => Value::Text(n.to_string()),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Bool(b) => Value::Text(b.to_string()),
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                return Err(LoadError::format(format!(
                    "Error reading JSON file: field '{key}' in element {} is nested; only flat records are supported",
                    idx + 1
                )));
            }
        };
        record.insert(key, scalar);
    }
    Ok(record)
}

/// Parses CSV text with a header row. Keys are trimmed, blank keys dropped,
/// and numeric-looking cells become numbers.
pub fn parse_csv(text: &str, row_limit: usize) -> LoadResult<Vec<Record>> {
    let mut reader = io_utils::open_csv_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|err| LoadError::format(format!("Error parsing CSV file: {err}")))?
        .clone();
    let keyed_columns = headers
        .iter()
        .enumerate()
        .filter(|(_, key)| !key.trim().is_empty())
        .map(|(idx, key)| (idx, key.trim().to_string()))
        .collect::<Vec<_>>();

    let mut records = Vec::new();
    let mut rows_seen = 0usize;
    for (row_idx, row) in reader.records().enumerate() {
        let row = row.map_err(|err| {
            LoadError::format(format!(
                "Error parsing CSV file at row {}: {err}",
                row_idx + 2
            ))
        })?;
        rows_seen += 1;
        if rows_seen > row_limit {
            continue;
        }
        let mut record = Record::new();
        for (idx, key) in &keyed_columns {
            if let Some(raw) = row.get(*idx) {
                record.insert(key.clone(), Value::from_cell(raw));
            }
        }
        records.push(record);
    }
    if rows_seen > row_limit {
        return Err(LoadError::SizeLimit {
            rows: rows_seen,
            limit: row_limit,
        });
    }
    Ok(records)
}
