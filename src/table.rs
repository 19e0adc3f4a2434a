//! Plain-text table rendering for the command-line front end.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::{
    data::{Record, Value, format_number},
    schema::ColumnDescriptor,
    sort::{SortDirection, SortSpec},
};

/// Columns shown by `view` unless the caller asks for more.
pub const DEFAULT_VISIBLE_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let align = vec![Align::Left; headers.len()];
    render_aligned(headers, rows, &align)
}

pub fn render_aligned(headers: &[String], rows: &[Vec<String>], align: &[Align]) -> String {
    let mut widths = headers.iter().map(|h| cell_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths, align));
    let rule = widths.iter().map(|w| "-".repeat((*w).max(3))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule, &widths, &[]));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths, align));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

/// Renders the first `max_columns` columns of `records`, numbers grouped by
/// thousands and right-aligned, with a sort marker on each header.
pub fn render_view<'a, I>(
    columns: &[ColumnDescriptor],
    records: I,
    sort: &SortSpec,
    max_columns: usize,
) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let shown = &columns[..columns.len().min(max_columns)];
    let headers = shown
        .iter()
        .map(|column| header_label(&column.name, sort))
        .collect::<Vec<_>>();
    let mut align = vec![Align::Left; shown.len()];
    let rows = records
        .into_iter()
        .map(|record| {
            shown
                .iter()
                .enumerate()
                .map(|(idx, column)| match record.get(&column.name) {
                    Some(Value::Number(n)) => {
                        align[idx] = Align::Right;
                        group_thousands(*n)
                    }
                    Some(other) => other.as_display(),
                    None => String::new(),
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    render_aligned(&headers, &rows, &align)
}

fn header_label(name: &str, sort: &SortSpec) -> String {
    let mut chars = name.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    let marker = match (sort.column.as_deref() == Some(name), sort.direction) {
        (true, SortDirection::Asc) => "▲",
        (true, SortDirection::Desc) => "▼",
        (false, _) => "⇅",
    };
    format!("{capitalized} {marker}")
}

/// `1234567.5` → `1,234,567.5`.
pub fn group_thousands(value: f64) -> String {
    let text = format_number(value);
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (unsigned, None),
    };
    if !integer.bytes().all(|b| b.is_ascii_digit()) {
        return text;
    }
    let grouped = integer
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .join(",");
    match fraction {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn format_row(values: &[String], widths: &[usize], align: &[Align]) -> String {
    let line = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let cell = value.replace(['\n', '\r', '\t'], " ");
            let padding = " ".repeat(width.saturating_sub(cell_width(&cell)));
            match align.get(idx) {
                Some(Align::Right) => format!("{padding}{cell}"),
                _ => format!("{cell}{padding}"),
            }
        })
        .join("  ");
    line.trim_end().to_string()
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}
