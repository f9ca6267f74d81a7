//! Median imputation.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use pns_common::column_as_f64;

use crate::stats::median;

/// Values filled per column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImputeReport {
    pub filled: BTreeMap<String, usize>,
}

impl ImputeReport {
    pub fn total(&self) -> usize {
        self.filled.values().sum()
    }
}

/// Fill missing values of each listed numeric column with its own median.
///
/// Absent columns, non-numeric columns and columns with no observed value
/// are left alone. A column without missing values is not rewritten.
pub fn impute_median<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> Result<ImputeReport> {
    let mut report = ImputeReport::default();

    for name in columns {
        let name = name.as_ref();
        let Ok(column) = df.column(name) else {
            continue;
        };
        if !column.dtype().is_primitive_numeric() {
            tracing::warn!(column = name, dtype = %column.dtype(), "skipping non-numeric column");
            continue;
        }
        let missing = column.null_count();
        if missing == 0 {
            continue;
        }
        let values = column_as_f64(column)?;
        let Some(fill) = median(&values) else {
            continue;
        };

        let filled = values.fill_null_with_values(fill)?;
        df.with_column(filled.into_series())?;
        report.filled.insert(name.to_string(), missing);
        tracing::debug!(column = name, filled = missing, median = fill, "imputed median");
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_with_column_median() {
        let mut df = DataFrame::new(vec![
            Series::new("renda".into(), vec![Some(100.0), None, Some(300.0), Some(200.0)]).into(),
            Series::new("anos".into(), vec![Some(4), Some(8), None, None]).into(),
        ])
        .unwrap();

        let report = impute_median(&mut df, &["renda", "anos", "ausente"]).unwrap();

        let renda: Vec<_> = df.column("renda").unwrap().f64().unwrap().into_iter().collect();
        let anos: Vec<_> = df.column("anos").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(renda, vec![Some(100.0), Some(200.0), Some(300.0), Some(200.0)]);
        assert_eq!(anos, vec![Some(4.0), Some(8.0), Some(6.0), Some(6.0)]);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn unlisted_columns_are_untouched() {
        let mut df = DataFrame::new(vec![
            Series::new("renda".into(), vec![Some(1.0), None]).into(),
        ])
        .unwrap();

        let report = impute_median(&mut df, &["idade"]).unwrap();

        assert_eq!(df.column("renda").unwrap().null_count(), 1);
        assert_eq!(report, ImputeReport::default());
    }

    #[test]
    fn imputation_is_idempotent() {
        let mut df = DataFrame::new(vec![
            Series::new("renda".into(), vec![Some(1.0), None, Some(3.0)]).into(),
        ])
        .unwrap();
        impute_median(&mut df, &["renda"]).unwrap();
        let once = df.clone();

        let report = impute_median(&mut df, &["renda"]).unwrap();

        assert_eq!(report.total(), 0);
        assert!(df.equals_missing(&once));
    }
}
