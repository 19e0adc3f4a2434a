use anyhow::{Context, Result, anyhow};

use crate::{data::Record, io_utils};

/// Serializes `rows` as CSV: a header line of `columns`, then one line per
/// record with its values in column order. Missing values are written empty.
/// Lines are newline-joined with no trailing newline.
pub fn to_csv<'a, I>(columns: &[String], rows: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    if columns.is_empty() {
        return Ok(String::new());
    }
    let mut writer = io_utils::csv_writer(Vec::new());
    writer
        .write_record(columns)
        .context("Writing CSV header")?;
    for (idx, record) in rows.into_iter().enumerate() {
        let cells = columns
            .iter()
            .map(|column| record.get(column).map(|v| v.as_display()).unwrap_or_default());
        writer
            .write_record(cells)
            .with_context(|| format!("Writing CSV row {}", idx + 1))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV output: {}", err.error()))?;
    let mut text = String::from_utf8(bytes).context("CSV output is not UTF-8")?;
    while text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}
