//! Numeric row predicates and the population filter.
//!
//! Every predicate reads its column as numbers first; values that do not
//! parse are missing and never satisfy a comparison.

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use pns_common::column_as_f64;
use pns_model::{MissingColumnError, PopulationRule};

/// Comparison operator for [`compare_numeric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }

    pub fn test(self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Gt => left > right,
            CompareOp::Lt => left < right,
            CompareOp::Ge => left >= right,
            CompareOp::Le => left <= right,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompareOp {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "==" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            "<" => Ok(CompareOp::Lt),
            ">=" => Ok(CompareOp::Ge),
            "<=" => Ok(CompareOp::Le),
            other => anyhow::bail!("unsupported comparison operator '{other}'"),
        }
    }
}

/// Which bounds of [`between_numeric`] are included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusive {
    #[default]
    Both,
    Neither,
    Left,
    Right,
}

impl FromStr for Inclusive {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(Inclusive::Both),
            "neither" => Ok(Inclusive::Neither),
            "left" => Ok(Inclusive::Left),
            "right" => Ok(Inclusive::Right),
            other => anyhow::bail!("unsupported inclusive mode '{other}'"),
        }
    }
}

fn numeric_column(df: &DataFrame, column: &str) -> Result<Float64Chunked> {
    let Ok(values) = df.column(column) else {
        return Err(MissingColumnError::new(column).into());
    };
    Ok(column_as_f64(values)?)
}

fn mask<F>(df: &DataFrame, column: &str, predicate: F) -> Result<BooleanChunked>
where
    F: Fn(f64) -> bool,
{
    let values = numeric_column(df, column)?;
    Ok(values
        .into_iter()
        .map(|value| value.is_some_and(&predicate))
        .collect::<BooleanChunked>()
        .with_name(column.into()))
}

/// Rows where `column <op> value` holds.
pub fn compare_numeric(df: &DataFrame, column: &str, op: CompareOp, value: f64) -> Result<BooleanChunked> {
    mask(df, column, |left| op.test(left, value))
}

/// Rows where `column` lies between `lower` and `upper`.
pub fn between_numeric(
    df: &DataFrame,
    column: &str,
    lower: f64,
    upper: f64,
    inclusive: Inclusive,
) -> Result<BooleanChunked> {
    mask(df, column, |v| match inclusive {
        Inclusive::Both => lower <= v && v <= upper,
        Inclusive::Neither => lower < v && v < upper,
        Inclusive::Left => lower <= v && v < upper,
        Inclusive::Right => lower < v && v <= upper,
    })
}

/// Rows where `column` is missing or not a number.
pub fn is_missing(df: &DataFrame, column: &str) -> Result<BooleanChunked> {
    let values = numeric_column(df, column)?;
    Ok(values
        .into_iter()
        .map(|value| value.is_none())
        .collect::<BooleanChunked>()
        .with_name(column.into()))
}

/// Row counts around the population filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub before: usize,
    pub after: usize,
}

impl FilterReport {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Keep only rows whose age is at least the rule's minimum.
///
/// Rows with a missing or unparseable age are dropped. The age column must
/// exist.
pub fn filter_population(df: &mut DataFrame, rule: &PopulationRule) -> Result<FilterReport> {
    let before = df.height();
    let keep = compare_numeric(df, &rule.age_column, CompareOp::Ge, rule.min_age)?;
    *df = df.filter(&keep)?;

    let report = FilterReport {
        before,
        after: df.height(),
    };
    tracing::debug!(
        column = %rule.age_column,
        min_age = rule.min_age,
        removed = report.removed(),
        "population filter applied"
    );
    Ok(report)
}
