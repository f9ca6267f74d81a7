use anyhow::Result;
use polars::prelude::*;

use pns_common::column_as_f64;

use super::{Derivation, missing_columns, set_column};

pub const MULTIMORBIDITY_COUNT_COLUMN: &str = "multimorbidity_count";
pub const MULTIMORBIDITY_CATEGORY_COLUMN: &str = "multimorbidity_category";

/// Ordinal bucket for a chronic-condition count.
///
/// Right-closed intervals `(-1,0]`, `(0,1]`, `(1,2]`, `(2,100]`; counts
/// outside `(-1,100]` have no category.
pub fn multimorbidity_category(count: i64) -> Option<&'static str> {
    match count {
        0 => Some("0"),
        1 => Some("1"),
        2 => Some("2"),
        3..=100 => Some("3+"),
        _ => None,
    }
}

/// Count chronic conditions and bucket the count.
///
/// Requires every chronic column. Missing flags count as 0.
pub fn derive_multimorbidity<S: AsRef<str>>(df: &mut DataFrame, chronic: &[S]) -> Result<Derivation> {
    let missing = missing_columns(df, chronic);
    if chronic.is_empty() || !missing.is_empty() {
        return Ok(Derivation::Skipped { missing });
    }

    let mut counts = vec![0i32; df.height()];
    for name in chronic {
        let values = column_as_f64(df.column(name.as_ref())?)?;
        for (count, value) in counts.iter_mut().zip(values.into_iter()) {
            *count += value.unwrap_or(0.0) as i32;
        }
    }
    let categories: Vec<Option<&str>> = counts
        .iter()
        .map(|&count| multimorbidity_category(i64::from(count)))
        .collect();

    set_column(df, MULTIMORBIDITY_COUNT_COLUMN, counts)?;
    set_column(df, MULTIMORBIDITY_CATEGORY_COLUMN, categories)?;
    Ok(Derivation::applied([
        MULTIMORBIDITY_COUNT_COLUMN,
        MULTIMORBIDITY_CATEGORY_COLUMN,
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_are_right_closed() {
        assert_eq!(multimorbidity_category(0), Some("0"));
        assert_eq!(multimorbidity_category(1), Some("1"));
        assert_eq!(multimorbidity_category(2), Some("2"));
        assert_eq!(multimorbidity_category(3), Some("3+"));
        assert_eq!(multimorbidity_category(7), Some("3+"));
        assert_eq!(multimorbidity_category(-1), None);
        assert_eq!(multimorbidity_category(101), None);
    }

    #[test]
    fn counts_sum_flags_per_row() {
        let mut df = DataFrame::new(vec![
            Series::new("a".into(), vec![1, 0, 1]).into(),
            Series::new("b".into(), vec![Some(1), None, Some(1)]).into(),
            Series::new("c".into(), vec![1, 0, 0]).into(),
        ])
        .unwrap();

        derive_multimorbidity(&mut df, &["a", "b", "c"]).unwrap();

        let counts: Vec<_> = df
            .column(MULTIMORBIDITY_COUNT_COLUMN)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .collect();
        let categories: Vec<_> = df
            .column(MULTIMORBIDITY_CATEGORY_COLUMN)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(counts, vec![Some(3), Some(0), Some(2)]);
        assert_eq!(categories, vec![Some("3+"), Some("0"), Some("2")]);
    }

    #[test]
    fn skipped_when_a_chronic_column_is_absent() {
        let mut df = DataFrame::new(vec![Series::new("a".into(), vec![1]).into()]).unwrap();
        let outcome = derive_multimorbidity(&mut df, &["a", "b"]).unwrap();
        assert_eq!(
            outcome,
            Derivation::Skipped {
                missing: vec!["b".to_string()]
            }
        );
    }
}
