//! Derived health indicators.
//!
//! Each derivation checks for its input columns and is skipped, not failed,
//! when any of them is absent. Dataset-wide statistics (medians, maxima,
//! z-scores) are computed over the table as given, so the table must hold
//! every record before this stage runs.

mod bmi;
mod flags;
mod functional;
mod health;
mod multimorbidity;

use anyhow::Result;
use polars::prelude::*;
use serde::Serialize;

use pns_model::DerivationProfile;

pub use bmi::{BMI_COLUMN, derive_bmi};
pub use flags::{
    SUS_COLUMN, binary_flag, copy_column, derive_binary_flags, derive_copies, derive_sus_flag,
};
pub use functional::{
    ADL_SCORE_COLUMN, FUNCTIONAL_RAW_COLUMN, FUNCTIONAL_SCORE_COLUMN, IADL_SCORE_COLUMN,
    derive_activity_score, derive_functional_score,
};
pub use health::{HEALTH_SCORE_COLUMN, HEALTH_WEIGHTS, derive_health_score};
pub use multimorbidity::{
    MULTIMORBIDITY_CATEGORY_COLUMN, MULTIMORBIDITY_COUNT_COLUMN, derive_multimorbidity,
    multimorbidity_category,
};

/// Outcome of a single derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Derivation {
    /// Columns written, plus the number of values filled by imputation.
    Applied { columns: Vec<String>, imputed: usize },
    /// Required inputs that were absent.
    Skipped { missing: Vec<String> },
}

impl Derivation {
    pub fn applied<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Derivation::Applied {
            columns: columns.into_iter().map(Into::into).collect(),
            imputed: 0,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Derivation::Applied { .. })
    }
}

/// One named step of the derivation sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivationStep {
    pub name: &'static str,
    #[serde(flatten)]
    pub outcome: Derivation,
}

/// Outcomes of every derivation, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivationReport {
    pub steps: Vec<DerivationStep>,
}

impl DerivationReport {
    fn record(&mut self, name: &'static str, outcome: Derivation) {
        if let Derivation::Skipped { missing } = &outcome {
            tracing::debug!(
                derivation = name,
                missing = %missing.join(","),
                "derivation skipped"
            );
        }
        self.steps.push(DerivationStep { name, outcome });
    }

    pub fn get(&self, name: &str) -> Option<&Derivation> {
        self.steps
            .iter()
            .find(|step| step.name == name)
            .map(|step| &step.outcome)
    }

    pub fn applied_count(&self) -> usize {
        self.steps.iter().filter(|step| step.outcome.is_applied()).count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps.len() - self.applied_count()
    }
}

/// Run every configured derivation in order.
pub fn derive_indicators(df: &mut DataFrame, profile: &DerivationProfile) -> Result<DerivationReport> {
    let mut report = DerivationReport::default();

    if let Some(rule) = &profile.bmi {
        report.record("bmi", derive_bmi(df, rule)?);
    }
    report.record("binary_flags", derive_binary_flags(df, &profile.binary)?);
    report.record(
        "multimorbidity",
        derive_multimorbidity(df, &profile.chronic_columns)?,
    );
    report.record(
        "adl_score",
        derive_activity_score(
            df,
            &profile.adl_columns,
            &profile.difficulty_scale,
            ADL_SCORE_COLUMN,
        )?,
    );
    report.record(
        "iadl_score",
        derive_activity_score(
            df,
            &profile.iadl_columns,
            &profile.difficulty_scale,
            IADL_SCORE_COLUMN,
        )?,
    );
    report.record("functional_score", derive_functional_score(df)?);
    if let Some(rule) = &profile.sus {
        report.record("sus_dependency", derive_sus_flag(df, rule)?);
    }
    if !profile.copies.is_empty() {
        report.record("copies", derive_copies(df, &profile.copies)?);
    }
    if let Some(rule) = &profile.self_rated_health {
        report.record("health_score", derive_health_score(df, rule)?);
    }

    Ok(report)
}

/// Names from `columns` that are not in the frame.
pub(crate) fn missing_columns<S: AsRef<str>>(df: &DataFrame, columns: &[S]) -> Vec<String> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| df.column(name).is_err())
        .map(str::to_string)
        .collect()
}

pub(crate) fn set_column<T>(df: &mut DataFrame, name: &str, values: Vec<T>) -> Result<()>
where
    Series: NamedFrom<Vec<T>, [T]>,
{
    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}
