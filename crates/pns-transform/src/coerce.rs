//! Numeric coercion of allow-listed columns.

use std::collections::BTreeMap;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use pns_common::parse_f64;

/// Outcome of a coercion pass.
///
/// `failures` counts, per column, the non-blank values that did not parse
/// and were turned into missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoercionReport {
    pub converted_columns: usize,
    pub failures: BTreeMap<String, usize>,
}

impl CoercionReport {
    pub fn total_failures(&self) -> usize {
        self.failures.values().sum()
    }
}

/// Convert every listed column that is present to `Float64`.
///
/// Absent columns are ignored. Columns that are already numeric are left
/// untouched, so running the pass twice changes nothing.
pub fn coerce_numeric<S: AsRef<str>>(df: &mut DataFrame, columns: &[S]) -> Result<CoercionReport> {
    let mut report = CoercionReport::default();

    for name in columns {
        let name = name.as_ref();
        let Ok(column) = df.column(name) else {
            continue;
        };
        if column.dtype().is_primitive_numeric() {
            continue;
        }
        let strings = column.cast(&DataType::String)?;
        let mut failed = 0usize;
        let values: Vec<Option<f64>> = strings
            .str()?
            .into_iter()
            .map(|value| {
                let value = value?;
                let parsed = parse_f64(value);
                if parsed.is_none() && !value.trim().is_empty() {
                    failed += 1;
                }
                parsed
            })
            .collect();

        df.with_column(Column::new(name.into(), values))?;
        report.converted_columns += 1;
        if failed > 0 {
            report.failures.insert(name.to_string(), failed);
        }
    }

    if report.total_failures() > 0 {
        tracing::warn!(
            failure_count = report.total_failures(),
            column_count = report.failures.len(),
            "non-numeric values coerced to missing"
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("idade".into(), vec![Some("65"), Some(" 070"), Some("x"), None]).into(),
            Series::new("sexo".into(), vec!["1", "2", "1", "2"]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn invalid_values_become_missing() {
        let mut df = frame();
        let report = coerce_numeric(&mut df, &["idade", "ausente"]).unwrap();

        let idade = df.column("idade").unwrap().f64().unwrap();
        assert_eq!(
            idade.into_iter().collect::<Vec<_>>(),
            vec![Some(65.0), Some(70.0), None, None]
        );
        assert_eq!(report.converted_columns, 1);
        assert_eq!(report.failures.get("idade"), Some(&1));
        assert_eq!(df.column("sexo").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn coercion_is_idempotent() {
        let mut df = frame();
        coerce_numeric(&mut df, &["idade"]).unwrap();
        let once = df.clone();

        let report = coerce_numeric(&mut df, &["idade"]).unwrap();

        assert_eq!(report, CoercionReport::default());
        assert!(df.equals_missing(&once));
    }
}
