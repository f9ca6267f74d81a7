use anyhow::Result;
use polars::prelude::*;

use pns_common::{column_as_f64, parse_f64};
use pns_model::SelfRatedHealthRule;

use super::functional::FUNCTIONAL_SCORE_COLUMN;
use super::multimorbidity::MULTIMORBIDITY_COUNT_COLUMN;
use super::{Derivation, missing_columns, set_column};
use crate::stats::{min_max_normalize, zscores};

pub const HEALTH_SCORE_COLUMN: &str = "health_score";

/// Weights for self-rated health, multimorbidity and functional score.
pub const HEALTH_WEIGHTS: [f64; 3] = [-0.5, -0.7, 1.2];

fn self_rated_values(column: &Column, rule: &SelfRatedHealthRule) -> Result<Float64Chunked> {
    if column.dtype() != &DataType::String {
        return Ok(column_as_f64(column)?);
    }
    Ok(column
        .str()?
        .into_iter()
        .map(|value| {
            let value = value?.trim();
            rule.scale.get(value).copied().or_else(|| parse_f64(value))
        })
        .collect())
}

/// Composite health score in `[0, 1]`.
///
/// `raw = -0.5 z(self_rated) - 0.7 z(multimorbidity) + 1.2 z(functional)`,
/// then min-max scaled. Missing inputs sit at the mean (z = 0).
pub fn derive_health_score(df: &mut DataFrame, rule: &SelfRatedHealthRule) -> Result<Derivation> {
    let missing = missing_columns(
        df,
        &[
            rule.column.as_str(),
            MULTIMORBIDITY_COUNT_COLUMN,
            FUNCTIONAL_SCORE_COLUMN,
        ],
    );
    if !missing.is_empty() {
        return Ok(Derivation::Skipped { missing });
    }

    let self_rated = zscores(&self_rated_values(df.column(&rule.column)?, rule)?);
    let morbidity = zscores(&column_as_f64(df.column(MULTIMORBIDITY_COUNT_COLUMN)?)?);
    let functional = zscores(&column_as_f64(df.column(FUNCTIONAL_SCORE_COLUMN)?)?);

    let [w_self, w_morbidity, w_functional] = HEALTH_WEIGHTS;
    let raw: Vec<f64> = self_rated
        .iter()
        .zip(&morbidity)
        .zip(&functional)
        .map(|((s, m), f)| w_self * s + w_morbidity * m + w_functional * f)
        .collect();

    set_column(df, HEALTH_SCORE_COLUMN, min_max_normalize(&raw))?;
    Ok(Derivation::applied([HEALTH_SCORE_COLUMN]))
}
