//! Dataset-wide statistics shared by the derivations and the imputer.

use polars::prelude::*;

/// Guard added to the min-max denominator.
pub const MIN_MAX_EPSILON: f64 = 1e-9;

/// Population z-scores (divide by N).
///
/// Missing inputs, and every value of a column with zero spread, score 0.
pub fn zscores(values: &Float64Chunked) -> Vec<f64> {
    let mean = values.mean();
    let std = values.std(0);
    values
        .into_iter()
        .map(|value| match (value, mean, std) {
            (Some(v), Some(m), Some(s)) if s > 0.0 => (v - m) / s,
            _ => 0.0,
        })
        .collect()
}

/// Scale values to `[0, 1]` with `(v - min) / (max - min + eps)`.
///
/// A constant input maps to all zeros.
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min + MIN_MAX_EPSILON;
    values.iter().map(|v| (v - min) / range).collect()
}

/// Median of the non-missing values.
pub fn median(values: &Float64Chunked) -> Option<f64> {
    values.median().filter(|m| m.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ca(values: &[Option<f64>]) -> Float64Chunked {
        values.iter().copied().collect()
    }

    #[test]
    fn zscores_use_population_std() {
        let z = zscores(&ca(&[Some(1.0), Some(3.0)]));
        assert_eq!(z, vec![-1.0, 1.0]);
    }

    #[test]
    fn constant_and_missing_values_score_zero() {
        assert_eq!(zscores(&ca(&[Some(2.0), Some(2.0)])), vec![0.0, 0.0]);
        assert_eq!(zscores(&ca(&[Some(1.0), None, Some(3.0)]))[1], 0.0);
    }

    #[test]
    fn min_max_handles_constant_input() {
        assert_eq!(min_max_normalize(&[4.0, 4.0, 4.0]), vec![0.0, 0.0, 0.0]);
        let scaled = min_max_normalize(&[0.0, 5.0, 10.0]);
        assert_eq!(scaled[0], 0.0);
        assert!((scaled[1] - 0.5).abs() < 1e-6);
        assert!(scaled[2] <= 1.0 && scaled[2] > 0.999);
    }

    #[test]
    fn median_skips_missing() {
        assert_eq!(median(&ca(&[Some(1.0), None, Some(5.0), Some(3.0)])), Some(3.0));
        assert_eq!(median(&ca(&[None, None])), None);
    }
}
