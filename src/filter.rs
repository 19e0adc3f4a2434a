use crate::data::Record;

/// Case-insensitive substring search across every field of every record.
///
/// Returns the positions (into `records`) of matching rows, in their original
/// order. An empty term matches everything.
pub fn matching_rows(records: &[Record], term: &str) -> Vec<usize> {
    if term.is_empty() {
        return (0..records.len()).collect();
    }
    let needle = term.to_lowercase();
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| record_matches(record, &needle))
        .map(|(idx, _)| idx)
        .collect()
}

/// `needle` must already be lowercased.
pub fn record_matches(record: &Record, needle: &str) -> bool {
    record
        .values()
        .any(|value| value.as_match_text().to_lowercase().contains(needle))
}
