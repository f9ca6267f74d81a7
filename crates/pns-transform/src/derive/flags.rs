use anyhow::Result;
use polars::prelude::*;

use pns_common::{column_as_f64, parse_f64};
use pns_model::{BinaryFlagRule, ColumnCopy, SusRule};

use super::{Derivation, missing_columns, set_column};

/// SUS dependency output column.
pub const SUS_COLUMN: &str = "dependencia_SUS";

/// Map one cell to 0/1.
///
/// Positive labels and the number 1 give 1. Negative labels, other numbers,
/// unparseable text and missing values give 0.
pub fn binary_flag(value: Option<&str>, rule: &BinaryFlagRule) -> i32 {
    let Some(value) = value.map(str::trim) else {
        return 0;
    };
    if rule.positive_labels.iter().any(|label| label == value) {
        return 1;
    }
    if rule.negative_labels.iter().any(|label| label == value) {
        return 0;
    }
    i32::from(parse_f64(value) == Some(1.0))
}

fn flag_values(column: &Column, rule: &BinaryFlagRule) -> Result<Vec<i32>> {
    if column.dtype() == &DataType::String {
        return Ok(column
            .str()?
            .into_iter()
            .map(|value| binary_flag(value, rule))
            .collect());
    }
    Ok(column_as_f64(column)?
        .into_iter()
        .map(|value| i32::from(value == Some(1.0)))
        .collect())
}

/// Coerce every configured yes/no column that is present to a 0/1 integer.
pub fn derive_binary_flags(df: &mut DataFrame, rule: &BinaryFlagRule) -> Result<Derivation> {
    let mut converted = Vec::new();
    for name in &rule.columns {
        let Ok(column) = df.column(name) else {
            continue;
        };
        let values = flag_values(column, rule)?;
        set_column(df, name, values)?;
        converted.push(name.clone());
    }

    if converted.is_empty() && !rule.columns.is_empty() {
        return Ok(Derivation::Skipped {
            missing: rule.columns.clone(),
        });
    }
    Ok(Derivation::applied(converted))
}

/// `dependencia_SUS = 1` iff the plan column holds the "no plan" value and
/// the care column holds the "uses public care" value.
pub fn derive_sus_flag(df: &mut DataFrame, rule: &SusRule) -> Result<Derivation> {
    let missing = missing_columns(df, &[&rule.plan_column, &rule.care_column]);
    if !missing.is_empty() {
        return Ok(Derivation::Skipped { missing });
    }

    let no_plan = rule.no_plan_value as f64;
    let uses_care = rule.uses_care_value as f64;
    let plan = column_as_f64(df.column(&rule.plan_column)?)?;
    let care = column_as_f64(df.column(&rule.care_column)?)?;
    let flags: Vec<i32> = plan
        .into_iter()
        .zip(care.into_iter())
        .map(|(plan, care)| i32::from(plan == Some(no_plan) && care == Some(uses_care)))
        .collect();

    set_column(df, SUS_COLUMN, flags)?;
    Ok(Derivation::applied([SUS_COLUMN]))
}

/// Copy a column under a new name. Returns the number of rows copied,
/// or 0 when the source is absent.
pub fn copy_column(df: &mut DataFrame, source: &str, target: &str) -> Result<usize> {
    let Ok(column) = df.column(source) else {
        return Ok(0);
    };
    let renamed = column.clone().with_name(target.into());
    df.with_column(renamed)?;
    Ok(df.height())
}

/// Apply every configured column copy whose source is present.
pub fn derive_copies(df: &mut DataFrame, copies: &[ColumnCopy]) -> Result<Derivation> {
    let mut written = Vec::new();
    let mut missing = Vec::new();
    for copy in copies {
        if df.column(&copy.source).is_err() {
            missing.push(copy.source.clone());
            continue;
        }
        copy_column(df, &copy.source, &copy.target)?;
        written.push(copy.target.clone());
    }
    if written.is_empty() {
        return Ok(Derivation::Skipped { missing });
    }
    Ok(Derivation::applied(written))
}
