#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pns_model::{DesiredColumns, PositionOverride, RecodeTables, SurveyProfile};

use crate::csv_utils::{get_field, read_csv_rows, require_column};
use crate::error::{CodebookError, Result};
use crate::manifest::{MANIFEST_SCHEMA, Manifest, SurveyInfo};
use crate::paths::{MANIFEST_FILE, default_codebook_dir};

/// Everything the pipeline needs to know about one survey edition.
#[derive(Debug, Clone)]
pub struct Codebook {
    pub dir: PathBuf,
    pub survey: SurveyInfo,
    pub desired: DesiredColumns,
    pub overrides: Vec<PositionOverride>,
    /// Keyed by output column name.
    pub recodes: RecodeTables,
    pub profile: SurveyProfile,
}

impl Codebook {
    /// Sidecar heading, falling back to the survey name.
    pub fn title(&self) -> &str {
        self.survey.title.as_deref().unwrap_or(&self.survey.name)
    }
}

/// Load the bundled codebook (or the one named by `PNS_CODEBOOK_DIR`).
pub fn load_default_codebook() -> Result<Codebook> {
    load_codebook(&default_codebook_dir())
}

/// Load and validate a codebook directory.
pub fn load_codebook(dir: &Path) -> Result<Codebook> {
    let manifest = load_manifest(&dir.join(MANIFEST_FILE))?;
    validate_manifest(&manifest)?;

    let desired = load_desired_columns(&dir.join(&manifest.files.columns))?;
    let recodes = match &manifest.files.recodes {
        Some(file) => load_recodes(&dir.join(file))?,
        None => RecodeTables::new(),
    };

    tracing::debug!(
        codebook = %dir.display(),
        survey = %manifest.survey.name,
        desired_count = desired.len(),
        recode_tables = recodes.len(),
        override_count = manifest.overrides.len(),
        "loaded codebook"
    );

    Ok(Codebook {
        dir: dir.to_path_buf(),
        survey: manifest.survey,
        desired,
        overrides: manifest.overrides,
        recodes,
        profile: manifest.profile,
    })
}

pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let text = std::fs::read_to_string(path).map_err(|source| CodebookError::io(path, source))?;
    toml::from_str(&text).map_err(|source| CodebookError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_manifest(manifest: &Manifest) -> Result<()> {
    if manifest.codebook.schema != MANIFEST_SCHEMA {
        return Err(CodebookError::invalid(format!(
            "unexpected schema '{}', expected '{MANIFEST_SCHEMA}'",
            manifest.codebook.schema
        )));
    }
    if manifest.survey.chunk_size == 0 {
        return Err(CodebookError::invalid("chunk_size must be positive"));
    }
    let mut seen = BTreeSet::new();
    for correction in &manifest.overrides {
        correction.to_field_spec()?;
        if !seen.insert(correction.code.as_str()) {
            return Err(CodebookError::invalid(format!(
                "duplicate override for {}",
                correction.code
            )));
        }
    }
    Ok(())
}

/// Read the `code,name` desired-column map, keeping file order.
pub fn load_desired_columns(path: &Path) -> Result<DesiredColumns> {
    let rows = read_csv_rows(path)?;
    require_column(&rows, "code", path)?;
    require_column(&rows, "name", path)?;

    let mut desired = DesiredColumns::new();
    let mut names = BTreeSet::new();
    for row in &rows {
        let code = get_field(row, "code");
        let name = get_field(row, "name");
        if code.is_empty() || name.is_empty() {
            continue;
        }
        if !names.insert(name.to_string()) {
            return Err(CodebookError::invalid(format!(
                "output column '{name}' is mapped twice in {}",
                path.display()
            )));
        }
        desired.push(code, name);
    }
    Ok(desired)
}

/// Read `column,code,label` rows into per-column recode tables.
pub fn load_recodes(path: &Path) -> Result<RecodeTables> {
    let rows = read_csv_rows(path)?;
    for column in ["column", "code", "label"] {
        require_column(&rows, column, path)?;
    }

    let mut tables = RecodeTables::new();
    for row in &rows {
        let column = get_field(row, "column");
        let code = get_field(row, "code");
        if column.is_empty() || code.is_empty() {
            continue;
        }
        tables.insert(column, code, get_field(row, "label"));
    }
    Ok(tables)
}
