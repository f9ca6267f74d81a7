//! Layout dictionary loading.
//!
//! The pre-processed variable dictionary is a CSV with one row per
//! category of each variable:
//!
//! | Código da variável | Posição inicial | Tamanho | Tipo | Descrição |
//! |--------------------|-----------------|---------|------|-----------|
//! | C006               | 107             | 1       | 1    | Homem     |
//! | C006               | 107             | 1       | 2    | Mulher    |
//!
//! The first non-empty position and length of a variable define its field.
//! A row with an empty variable code continues the previous variable.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;

use pns_model::{FieldSpec, Layout, RecodeTables};

use crate::error::{IngestError, Result};

const CODE_HEADERS: &[&str] = &["codigodavariavel", "codigovariavel", "variavel", "var", "code"];
const START_HEADERS: &[&str] = &["posicaoinicial", "posicao", "inicio", "start"];
const LENGTH_HEADERS: &[&str] = &["tamanho", "length", "width"];
const CATEGORY_HEADERS: &[&str] = &["tipo", "categoriastipo", "categoria", "categorycode"];
const DESCRIPTION_HEADERS: &[&str] = &[
    "descricao",
    "categoriasdescricao",
    "descricaodacategoria",
    "label",
];

/// Field layout plus category labels read from a variable dictionary.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    pub layout: Layout,
    /// Category labels keyed by variable code.
    pub labels: RecodeTables,
}

impl Dictionary {
    /// `(start, end)` pairs in dictionary order.
    pub fn colspecs(&self) -> Vec<(usize, usize)> {
        self.layout.colspecs()
    }

    /// Variable codes in dictionary order.
    pub fn names(&self) -> Vec<String> {
        self.layout.codes().map(str::to_string).collect()
    }
}

/// Lowercase and strip accents and punctuation so header aliases compare equal.
fn fold_header(header: &str) -> String {
    header
        .trim_matches('\u{feff}')
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ã' | 'â' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'õ' | 'ô' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

fn find_column<'a>(headers: &'a [(String, String)], aliases: &[&str]) -> Option<&'a str> {
    headers
        .iter()
        .find(|(folded, _)| aliases.contains(&folded.as_str()))
        .map(|(_, original)| original.as_str())
}

fn require_column<'a>(
    headers: &'a [(String, String)],
    aliases: &[&str],
    label: &str,
    path: &Path,
) -> Result<&'a str> {
    find_column(headers, aliases).ok_or_else(|| IngestError::MissingColumn {
        column: label.to_string(),
        path: path.to_path_buf(),
    })
}

fn parse_position(value: &str, field: &str, code: &str, path: &Path) -> Result<usize> {
    let invalid = || IngestError::InvalidValue {
        field: field.to_string(),
        code: code.to_string(),
        value: value.to_string(),
        path: path.to_path_buf(),
    };
    let number: f64 = value.trim().parse().map_err(|_| invalid())?;
    if number.fract() != 0.0 || number < 0.0 || !number.is_finite() {
        return Err(invalid());
    }
    Ok(number as usize)
}

fn string_values(df: &DataFrame, name: Option<&str>, height: usize) -> Result<Vec<String>> {
    let Some(name) = name else {
        return Ok(vec![String::new(); height]);
    };
    let column = df.column(name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.unwrap_or("").trim().to_string())
        .collect())
}

#[derive(Default)]
struct PendingField {
    start: Option<usize>,
    length: Option<usize>,
}

/// Load a variable dictionary CSV.
pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let headers: Vec<(String, String)> = df
        .get_column_names()
        .into_iter()
        .map(|name| (fold_header(name), name.to_string()))
        .collect();
    let code_col = require_column(&headers, CODE_HEADERS, "Código da variável", path)?;
    let start_col = require_column(&headers, START_HEADERS, "Posição inicial", path)?;
    let length_col = require_column(&headers, LENGTH_HEADERS, "Tamanho", path)?;
    let category_col = find_column(&headers, CATEGORY_HEADERS);
    let description_col = find_column(&headers, DESCRIPTION_HEADERS);

    let height = df.height();
    let codes = string_values(&df, Some(code_col), height)?;
    let starts = string_values(&df, Some(start_col), height)?;
    let lengths = string_values(&df, Some(length_col), height)?;
    let categories = string_values(&df, category_col, height)?;
    let descriptions = string_values(&df, description_col, height)?;

    let mut order: Vec<String> = Vec::new();
    let mut pending: BTreeMap<String, PendingField> = BTreeMap::new();
    let mut labels = RecodeTables::new();
    let mut current = String::new();

    for row in 0..height {
        if !codes[row].is_empty() {
            current.clone_from(&codes[row]);
        }
        if current.is_empty() {
            continue;
        }
        let field = pending.entry(current.clone()).or_insert_with(|| {
            order.push(current.clone());
            PendingField::default()
        });
        if field.start.is_none() && !starts[row].is_empty() {
            field.start = Some(parse_position(&starts[row], "Posição inicial", &current, path)?);
        }
        if field.length.is_none() && !lengths[row].is_empty() {
            field.length = Some(parse_position(&lengths[row], "Tamanho", &current, path)?);
        }
        if !categories[row].is_empty() {
            labels.insert(current.as_str(), categories[row].as_str(), descriptions[row].as_str());
        }
    }

    let mut layout = Layout::new();
    let mut incomplete = 0usize;
    for code in order {
        match pending.remove(&code) {
            Some(PendingField {
                start: Some(position),
                length: Some(length),
            }) if position >= 1 => {
                layout.insert(FieldSpec::new(code, position - 1, length)?);
            }
            _ => incomplete += 1,
        }
    }

    if incomplete > 0 {
        tracing::warn!(
            path = %path.display(),
            incomplete,
            "dictionary variables without position or length were skipped"
        );
    }
    tracing::info!(
        path = %path.display(),
        field_count = layout.len(),
        labelled_variables = labels.len(),
        "loaded dictionary"
    );

    Ok(Dictionary { layout, labels })
}
