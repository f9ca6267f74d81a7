use anyhow::Result;
use polars::prelude::*;

use pns_common::column_as_f64;
use pns_model::BmiRule;

use super::{Derivation, missing_columns, set_column};
use crate::stats::median;

/// Body-mass index output column.
pub const BMI_COLUMN: &str = "imc";

/// Compute `imc = weight / height_m²`.
///
/// The height column is rewritten in meters. Missing or non-finite BMI
/// values are filled once with the median of the computed values.
pub fn derive_bmi(df: &mut DataFrame, rule: &BmiRule) -> Result<Derivation> {
    let missing = missing_columns(df, &[&rule.weight_column, &rule.height_column]);
    if !missing.is_empty() {
        return Ok(Derivation::Skipped { missing });
    }

    let weight = column_as_f64(df.column(&rule.weight_column)?)?;
    let height_m: Vec<Option<f64>> = column_as_f64(df.column(&rule.height_column)?)?
        .into_iter()
        .map(|h| h.map(|h| h / rule.height_divisor))
        .collect();

    let imc: Float64Chunked = weight
        .into_iter()
        .zip(height_m.iter())
        .map(|(w, h)| match (w, h) {
            (Some(w), Some(h)) => Some(w / (h * h)).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect::<Float64Chunked>()
        .with_name(BMI_COLUMN.into());

    set_column(df, &rule.height_column, height_m)?;

    let imputed = imc.null_count();
    let imc = match median(&imc) {
        Some(fill) if imputed > 0 => imc.fill_null_with_values(fill)?,
        _ => imc,
    };
    df.with_column(imc.into_series())?;

    if imputed > 0 {
        tracing::debug!(column = BMI_COLUMN, imputed, "median filled BMI");
    }
    Ok(Derivation::Applied {
        columns: vec![BMI_COLUMN.to_string(), rule.height_column.clone()],
        imputed,
    })
}
