#![deny(unsafe_code)]

use std::path::PathBuf;

use pns_model::LayoutError;

#[derive(Debug, thiserror::Error)]
pub enum CodebookError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML manifest {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    #[error("invalid codebook: {message}")]
    InvalidCodebook { message: String },

    #[error("invalid position override: {0}")]
    Layout(#[from] LayoutError),
}

impl CodebookError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidCodebook {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodebookError>;
