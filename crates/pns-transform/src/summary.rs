//! Descriptive statistics for the configured summary variables.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use pns_common::column_as_f64;
use pns_model::SummaryVariable;

use crate::stats::median;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryStat {
    Numeric { mean: f64, median: f64 },
    Categorical { mode: String, count: usize },
    /// Column absent or entirely missing.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSummary {
    pub label: String,
    pub column: String,
    #[serde(flatten)]
    pub stat: SummaryStat,
}

fn describe(column: &Column) -> Result<SummaryStat> {
    if column.dtype().is_primitive_numeric() {
        let values = column_as_f64(column)?;
        return Ok(match (values.mean(), median(&values)) {
            (Some(mean), Some(median)) => SummaryStat::Numeric { mean, median },
            _ => SummaryStat::Unavailable,
        });
    }

    let strings = column.cast(&DataType::String)?;
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in strings.str()?.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    // Ties go to the lexicographically smallest value.
    let mode = counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (value, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((value, count)),
        });
    Ok(match mode {
        Some((value, count)) => SummaryStat::Categorical {
            mode: value.to_string(),
            count,
        },
        None => SummaryStat::Unavailable,
    })
}

/// Summarize each variable: mean and median for numbers, most common value
/// for text.
pub fn summarize(df: &DataFrame, variables: &[SummaryVariable]) -> Result<Vec<VariableSummary>> {
    variables
        .iter()
        .map(|variable| {
            let stat = match df.column(&variable.column) {
                Ok(column) => describe(column)?,
                Err(_) => SummaryStat::Unavailable,
            };
            Ok(VariableSummary {
                label: variable.label.clone(),
                column: variable.column.clone(),
                stat,
            })
        })
        .collect()
}
