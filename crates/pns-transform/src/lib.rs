//! Survey table transformations.
//!
//! Stages operate in place on a Polars `DataFrame` and report counts
//! instead of failing on bad values:
//!
//! - **coerce**: numeric parsing of allow-listed columns
//! - **filter**: numeric predicates and the age-based population filter
//! - **recode**: categorical code -> label mapping
//! - **derive**: BMI, binary flags, multimorbidity, functional and health scores, SUS dependency
//! - **impute**: median imputation
//! - **summary**: descriptive statistics for reporting

pub mod coerce;
pub mod derive;
pub mod filter;
pub mod impute;
pub mod recode;
pub mod stats;
pub mod summary;

pub use coerce::{CoercionReport, coerce_numeric};
pub use derive::{Derivation, DerivationReport, DerivationStep, derive_indicators};
pub use filter::{
    CompareOp, FilterReport, Inclusive, between_numeric, compare_numeric, filter_population,
    is_missing,
};
pub use impute::{ImputeReport, impute_median};
pub use recode::{RecodeReport, apply_recode_tables, recode_column};
pub use summary::{SummaryStat, VariableSummary, summarize};
