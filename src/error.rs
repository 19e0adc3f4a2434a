//! Load failures surfaced at the ingestion boundary.
//!
//! [`crate::explorer::Explorer`] reports these to the caller but keeps the
//! previously loaded dataset in place.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Input cannot be parsed as the declared format.
    #[error("{message}")]
    Format { message: String },

    #[error("Max {limit} rows are supported for now (got {rows}). Please upload a smaller file.")]
    SizeLimit { rows: usize, limit: usize },

    #[error("Unsupported file type '{file}'. Please upload a JSON or CSV file.")]
    UnsupportedType { file: String },

    /// Fetching a bundled sample dataset failed.
    #[error("Failed to load {dataset}: {reason}")]
    Network { dataset: String, reason: String },
}

impl LoadError {
    pub fn format(message: impl Into<String>) -> Self {
        LoadError::Format {
            message: message.into(),
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
