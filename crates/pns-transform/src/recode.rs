//! Categorical code to label mapping.

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use pns_common::{column_as_f64, format_numeric};
use pns_model::{RecodeTable, RecodeTables};

/// Counts from a recoding pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecodeReport {
    pub columns: usize,
    pub replaced: usize,
}

/// Replace raw codes with labels in one column.
///
/// Numeric cells are looked up by their shortest display form (`1.0` reads
/// as `1`). A null text cell is a blank field and looks up as `"0"`; it
/// stays null when the table has no such code. Unmapped values keep their
/// original text.
///
/// A numeric column with no mapped cell is left as it is. Once any cell
/// maps, the column becomes text and unmapped numbers keep their display
/// form. Returns the number of replaced cells.
pub fn recode_column(df: &mut DataFrame, column_name: &str, table: &RecodeTable) -> Result<usize> {
    let Ok(column) = df.column(column_name) else {
        return Ok(0);
    };
    let is_text = column.dtype() == &DataType::String;

    let raw_values: Vec<Option<String>> = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect(),
        dtype if dtype.is_primitive_numeric() => column_as_f64(column)?
            .into_iter()
            .map(|value| value.map(format_numeric))
            .collect(),
        _ => column
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect(),
    };

    let mut replaced = 0usize;
    let values: Vec<Option<String>> = raw_values
        .into_iter()
        .map(|value| {
            let lookup = match (&value, is_text) {
                (Some(raw), _) => table.lookup(raw),
                (None, true) => table.lookup(""),
                (None, false) => None,
            };
            match lookup {
                Some(label) => {
                    replaced += 1;
                    Some(label.to_string())
                }
                None => value,
            }
        })
        .collect();

    if replaced == 0 && !is_text {
        return Ok(0);
    }
    df.with_column(Column::new(column_name.into(), values))?;
    Ok(replaced)
}

/// Apply every registered table whose column is present.
pub fn apply_recode_tables(df: &mut DataFrame, tables: &RecodeTables) -> Result<RecodeReport> {
    let mut report = RecodeReport::default();
    for (column, table) in tables.iter() {
        if df.column(column).is_err() {
            continue;
        }
        report.replaced += recode_column(df, column, table)?;
        report.columns += 1;
    }
    tracing::debug!(
        columns = report.columns,
        replaced = report.replaced,
        "categorical labels applied"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RecodeTable {
        [("0", "Não sabe"), ("1", "Sim")].into_iter().collect()
    }

    fn strings(df: &DataFrame, name: &str) -> Vec<Option<String>> {
        df.column(name)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn zero_padded_codes_share_labels() {
        let mut df = DataFrame::new(vec![
            Series::new("flag".into(), vec!["0", "00", "1", "01"]).into(),
        ])
        .unwrap();

        let replaced = recode_column(&mut df, "flag", &table()).unwrap();

        assert_eq!(replaced, 4);
        assert_eq!(
            strings(&df, "flag"),
            vec![
                Some("Não sabe".into()),
                Some("Não sabe".into()),
                Some("Sim".into()),
                Some("Sim".into()),
            ]
        );
    }

    #[test]
    fn unmapped_values_keep_original_text() {
        let mut df = DataFrame::new(vec![
            Series::new("flag".into(), vec![Some("07"), Some(" 1"), None]).into(),
        ])
        .unwrap();
        let table: RecodeTable = [("1", "Sim")].into_iter().collect();

        recode_column(&mut df, "flag", &table).unwrap();

        assert_eq!(
            strings(&df, "flag"),
            vec![Some("07".into()), Some("Sim".into()), None]
        );
    }

    #[test]
    fn blank_text_cells_take_the_zero_label() {
        let mut df = DataFrame::new(vec![
            Series::new("flag".into(), vec![None, Some("1")]).into(),
        ])
        .unwrap();

        let replaced = recode_column(&mut df, "flag", &table()).unwrap();

        assert_eq!(replaced, 2);
        assert_eq!(
            strings(&df, "flag"),
            vec![Some("Não sabe".into()), Some("Sim".into())]
        );
    }

    #[test]
    fn numeric_column_without_matches_is_untouched() {
        let mut df = DataFrame::new(vec![
            Series::new("renda".into(), vec![Some(9.0), None]).into(),
        ])
        .unwrap();

        let replaced = recode_column(&mut df, "renda", &table()).unwrap();

        assert_eq!(replaced, 0);
        let values: Vec<Option<f64>> =
            df.column("renda").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(9.0), None]);
    }

    #[test]
    fn numeric_columns_recode_by_display_form() {
        let mut df = DataFrame::new(vec![
            Series::new("saude".into(), vec![Some(1.0), Some(2.0), None]).into(),
        ])
        .unwrap();

        recode_column(&mut df, "saude", &table()).unwrap();

        assert_eq!(
            strings(&df, "saude"),
            vec![Some("Sim".into()), Some("2".into()), None]
        );
    }

    #[test]
    fn only_present_columns_count() {
        let mut tables = RecodeTables::new();
        tables.insert("flag", "1", "Sim");
        tables.insert("ausente", "1", "Sim");
        let mut df = DataFrame::new(vec![Series::new("flag".into(), vec!["1"]).into()]).unwrap();

        let report = apply_recode_tables(&mut df, &tables).unwrap();

        assert_eq!(report, RecodeReport { columns: 1, replaced: 1 });
    }
}
