//! Error types for survey data ingestion.

use std::path::PathBuf;

use pns_model::LayoutError;
use thiserror::Error;

/// Errors that can occur during ingestion.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Layout Errors ===
    /// Layout entry or override is contradictory.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// Encoding label not recognized.
    #[error("unknown text encoding '{label}'")]
    UnknownEncoding { label: String },

    /// No module was given for a module selection.
    #[error("at least one survey module must be selected")]
    EmptyModuleSelection,

    // === Dictionary Errors ===
    /// Failed to parse the dictionary CSV.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Required column not found in the dictionary.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// Invalid value in a dictionary field.
    #[error("invalid {field} value '{value}' for {code} in {path}")]
    InvalidValue {
        field: String,
        code: String,
        value: String,
        path: PathBuf,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound { path }
        } else {
            Self::FileRead { path, source }
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
