#![deny(unsafe_code)]

use serde::{Deserialize, Serialize};

use pns_model::{PositionOverride, SurveyProfile};

pub const MANIFEST_SCHEMA: &str = "pns-codebook";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub codebook: ManifestHeader,
    pub survey: SurveyInfo,
    pub files: CodebookFiles,
    #[serde(default)]
    pub overrides: Vec<PositionOverride>,
    #[serde(default)]
    pub profile: SurveyProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestHeader {
    pub schema: String,
    pub schema_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyInfo {
    pub name: String,
    /// Heading written at the top of the column inventory sidecar.
    #[serde(default)]
    pub title: Option<String>,
    /// Encoding label of the raw microdata (WHATWG label, e.g. `latin1`).
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_encoding() -> String {
    "latin1".to_string()
}

fn default_chunk_size() -> usize {
    50_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodebookFiles {
    /// `code,name` desired-column map.
    pub columns: String,
    /// `column,code,label` recode entries.
    #[serde(default)]
    pub recodes: Option<String>,
}
