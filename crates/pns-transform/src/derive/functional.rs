use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;

use pns_common::{column_as_f64, parse_f64};

use super::{Derivation, missing_columns, set_column};

pub const ADL_SCORE_COLUMN: &str = "adl_score";
pub const IADL_SCORE_COLUMN: &str = "iadl_score";
pub const FUNCTIONAL_RAW_COLUMN: &str = "functional_raw";
pub const FUNCTIONAL_SCORE_COLUMN: &str = "functional_score";

/// Difficulty level of one cell: scale label, then number, else 0.
fn difficulty_level(value: Option<&str>, scale: &BTreeMap<String, i64>) -> i32 {
    let Some(value) = value.map(str::trim) else {
        return 0;
    };
    if let Some(&level) = scale.get(value) {
        return level as i32;
    }
    parse_f64(value).map_or(0, |v| v as i32)
}

fn difficulty_levels(column: &Column, scale: &BTreeMap<String, i64>) -> Result<Vec<i32>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|value| difficulty_level(value, scale))
            .collect());
    }
    Ok(column_as_f64(column)?
        .into_iter()
        .map(|value| value.map_or(0, |v| v as i32))
        .collect())
}

/// Coerce a group of difficulty columns to integer levels and sum them
/// into `target`.
///
/// Requires every column of the group; each coerced column is written back.
pub fn derive_activity_score<S: AsRef<str>>(
    df: &mut DataFrame,
    columns: &[S],
    scale: &BTreeMap<String, i64>,
    target: &str,
) -> Result<Derivation> {
    let missing = missing_columns(df, columns);
    if columns.is_empty() || !missing.is_empty() {
        return Ok(Derivation::Skipped { missing });
    }

    let mut scores = vec![0i32; df.height()];
    let mut written = Vec::with_capacity(columns.len() + 1);
    for name in columns {
        let name = name.as_ref();
        let levels = difficulty_levels(df.column(name)?, scale)?;
        for (score, level) in scores.iter_mut().zip(&levels) {
            *score += level;
        }
        set_column(df, name, levels)?;
        written.push(name.to_string());
    }

    set_column(df, target, scores)?;
    written.push(target.to_string());
    Ok(Derivation::applied(written))
}

/// `functional_score = 1 - raw / max(raw)` with the maximum floored at 1.
///
/// `raw` sums whichever of `adl_score` and `iadl_score` exist; at least
/// one must.
pub fn derive_functional_score(df: &mut DataFrame) -> Result<Derivation> {
    let groups: Vec<&str> = [ADL_SCORE_COLUMN, IADL_SCORE_COLUMN]
        .into_iter()
        .filter(|name| df.column(name).is_ok())
        .collect();
    if groups.is_empty() {
        return Ok(Derivation::Skipped {
            missing: vec![ADL_SCORE_COLUMN.to_string(), IADL_SCORE_COLUMN.to_string()],
        });
    }

    let mut raw = vec![0i32; df.height()];
    for name in &groups {
        let values = column_as_f64(df.column(name)?)?;
        for (total, value) in raw.iter_mut().zip(values.into_iter()) {
            *total += value.unwrap_or(0.0) as i32;
        }
    }
    let max_raw = raw.iter().copied().max().unwrap_or(0).max(1);
    let scores: Vec<f64> = raw
        .iter()
        .map(|&value| 1.0 - f64::from(value) / f64::from(max_raw))
        .collect();

    set_column(df, FUNCTIONAL_RAW_COLUMN, raw)?;
    set_column(df, FUNCTIONAL_SCORE_COLUMN, scores)?;
    Ok(Derivation::applied([
        FUNCTIONAL_RAW_COLUMN,
        FUNCTIONAL_SCORE_COLUMN,
    ]))
}
