//! Survey codebook loading.
//!
//! A codebook directory describes one survey edition as data:
//!
//! - `survey.toml`: survey metadata, position overrides and the column-role profile
//! - `columns.csv`: desired layout codes and their output column names
//! - `recodes.csv`: categorical code -> label tables per output column

pub mod csv_utils;
pub mod error;
pub mod loader;
pub mod manifest;
pub mod paths;

pub use error::{CodebookError, Result};
pub use loader::{
    Codebook, load_codebook, load_default_codebook, load_desired_columns, load_manifest,
    load_recodes,
};
pub use manifest::{CodebookFiles, MANIFEST_SCHEMA, Manifest, ManifestHeader, SurveyInfo};
pub use paths::{CODEBOOK_ENV_VAR, MANIFEST_FILE, codebook_root, default_codebook_dir};
