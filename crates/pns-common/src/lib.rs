//! Shared utilities for the survey pipeline crates.
//!
//! Polars value conversions used by more than one stage live here.

pub mod polars;

pub use polars::{column_as_f64, format_numeric, parse_f64};
