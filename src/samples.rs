//! Bundled sample datasets and the fetcher that resolves them to bytes.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDataset {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub description: String,
}

impl SampleDataset {
    pub fn new(name: &str, path: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        }
    }

    pub fn bundled() -> Vec<Self> {
        vec![
            SampleDataset::new(
                "Bollywood Movies",
                "bollywood_movies.json",
                "ratings, box office, and budget data",
            ),
            SampleDataset::new(
                "Indian Cities",
                "indian_cities.json",
                "population, GDP, and area statistics",
            ),
            SampleDataset::new(
                "Indian Companies",
                "indian_companies.json",
                "revenue and employee data",
            ),
        ]
    }
}

/// Resolves a catalog path to raw bytes.
pub trait SampleFetcher {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads catalog paths relative to a datasets directory.
#[derive(Debug, Clone)]
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SampleFetcher for DirectoryFetcher {
    fn fetch(&self, path: &str) -> io::Result<Vec<u8>> {
        let relative = path.trim_start_matches('/');
        if relative.split(['/', '\\']).any(|part| part == "..") {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("sample path '{path}' escapes the datasets directory"),
            ));
        }
        fs::read(self.root.join(relative))
    }
}
