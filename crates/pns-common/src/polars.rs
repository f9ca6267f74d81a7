//! Polars value helpers.

use polars::prelude::*;

/// Formats a float without trailing zeros (`1.0` -> `"1"`, `2.50` -> `"2.5"`).
pub fn format_numeric(v: f64) -> String {
    if !v.is_finite() {
        return v.to_string();
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Parses a trimmed string as a finite `f64`.
///
/// Empty strings, `NaN` and infinities are rejected so that they end up as
/// missing values rather than poisoning later statistics.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Reads a column as `Float64`, parsing strings value by value.
///
/// Numeric columns are cast; string columns go through [`parse_f64`] so
/// that unparseable text becomes null instead of failing the cast.
pub fn column_as_f64(column: &Column) -> PolarsResult<Float64Chunked> {
    match column.dtype() {
        DataType::String => {
            let values = column.str()?;
            Ok(values
                .into_iter()
                .map(|value| value.and_then(parse_f64))
                .collect::<Float64Chunked>()
                .with_name(column.name().clone()))
        }
        _ => {
            let cast = column.cast(&DataType::Float64)?;
            Ok(cast.f64()?.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(1.0), "1");
        assert_eq!(format_numeric(1.50), "1.5");
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(100.0), "100");
        assert_eq!(format_numeric(-0.0), "0");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("  "), None);
        assert_eq!(parse_f64(" 060 "), Some(60.0));
        assert_eq!(parse_f64("1.75"), Some(1.75));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
        assert_eq!(parse_f64("abc"), None);
    }

    #[test]
    fn test_column_as_f64_parses_strings() {
        let column = Column::new("idade".into(), ["65", " ", "x", "070"]);
        let values = column_as_f64(&column).unwrap();
        assert_eq!(
            values.into_iter().collect::<Vec<_>>(),
            vec![Some(65.0), None, None, Some(70.0)]
        );
    }

    #[test]
    fn test_column_as_f64_casts_integers() {
        let column = Column::new("n".into(), [1i64, 2]);
        let values = column_as_f64(&column).unwrap();
        assert_eq!(values.get(1), Some(2.0));
    }
}
