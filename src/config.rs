//! YAML settings: row ceiling, pie slice limit and the sample dataset catalog.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{chart::DEFAULT_PIE_SLICES, ingest::DEFAULT_ROW_LIMIT, samples::SampleDataset};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_rows: usize,
    pub pie_slices: usize,
    pub datasets_dir: PathBuf,
    pub default_sample: String,
    pub samples: Vec<SampleDataset>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_ROW_LIMIT,
            pie_slices: DEFAULT_PIE_SLICES,
            datasets_dir: PathBuf::from("datasets"),
            default_sample: "Indian Cities".to_string(),
            samples: SampleDataset::bundled(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Opening settings file {path:?}"))?;
        let settings = Self::from_yaml(&raw)
            .with_context(|| format!("Parsing settings file {path:?}"))?;
        Ok(settings)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_rows > 0, "max_rows must be positive");
        ensure!(self.pie_slices > 0, "pie_slices must be positive");
        Ok(())
    }

    pub fn sample(&self, name: &str) -> Option<&SampleDataset> {
        self.samples
            .iter()
            .find(|sample| sample.name.eq_ignore_ascii_case(name))
    }
}
