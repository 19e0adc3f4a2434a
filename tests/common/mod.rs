#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use graphit::data::{Dataset, Record, Value};
use tempfile::{TempDir, tempdir};

/// Returns the absolute path of the bundled sample datasets directory.
pub fn datasets_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("datasets")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub fn num(value: f64) -> Value {
    Value::Number(value)
}

pub fn city(name: &str, pop: f64) -> Record {
    [("city", text(name)), ("pop", num(pop))].into_iter().collect()
}

/// Pune(10), Agra(5), Pune(7).
pub fn three_cities() -> Dataset {
    Dataset::new(
        "cities",
        vec![city("Pune", 10.0), city("Agra", 5.0), city("Pune", 7.0)],
    )
}

/// JSON array of `count` objects `{"id": n, "label": "row n"}`.
pub fn json_rows(count: usize) -> String {
    let items = (0..count)
        .map(|n| format!(r#"{{"id":{n},"label":"row {n}"}}"#))
        .collect::<Vec<_>>();
    format!("[{}]", items.join(","))
}

/// CSV text with a header and `count` data rows.
pub fn csv_rows(count: usize) -> String {
    let mut text = String::from("id,label\n");
    for n in 0..count {
        text.push_str(&format!("{n},row {n}\n"));
    }
    text
}
