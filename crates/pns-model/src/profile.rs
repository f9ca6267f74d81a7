//! Column roles consumed by the transformation stages.
//!
//! A [`SurveyProfile`] names, per survey, which output columns are numeric,
//! which feed each derived indicator and which get median imputation. It is
//! deserialized from the `[profile]` table of a codebook manifest.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurveyProfile {
    #[serde(default)]
    pub population: PopulationRule,
    /// Columns coerced to numeric; all others stay trimmed strings.
    #[serde(default)]
    pub numeric_columns: Vec<String>,
    #[serde(default)]
    pub derivations: DerivationProfile,
    /// Columns whose missing values are replaced by the column median.
    #[serde(default)]
    pub impute_columns: Vec<String>,
    /// Variables reported in the end-of-run statistics.
    #[serde(default)]
    pub summary: Vec<SummaryVariable>,
}

/// Row selection by minimum age (inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRule {
    pub age_column: String,
    #[serde(default = "default_min_age")]
    pub min_age: f64,
}

fn default_min_age() -> f64 {
    60.0
}

impl Default for PopulationRule {
    fn default() -> Self {
        Self {
            age_column: "idade".to_string(),
            min_age: default_min_age(),
        }
    }
}

impl PopulationRule {
    pub fn new(age_column: impl Into<String>, min_age: f64) -> Self {
        Self {
            age_column: age_column.into(),
            min_age,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivationProfile {
    pub bmi: Option<BmiRule>,
    #[serde(default)]
    pub binary: BinaryFlagRule,
    /// Flags summed into the multimorbidity count.
    #[serde(default)]
    pub chronic_columns: Vec<String>,
    #[serde(default)]
    pub adl_columns: Vec<String>,
    #[serde(default)]
    pub iadl_columns: Vec<String>,
    /// Score per difficulty label. Values without an entry are parsed as numbers.
    #[serde(default)]
    pub difficulty_scale: BTreeMap<String, i64>,
    pub self_rated_health: Option<SelfRatedHealthRule>,
    pub sus: Option<SusRule>,
    /// Plain column copies taken after flag coercion.
    #[serde(default)]
    pub copies: Vec<ColumnCopy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiRule {
    pub weight_column: String,
    pub height_column: String,
    /// Height is divided by this before squaring (centimeters -> meters).
    #[serde(default = "default_height_divisor")]
    pub height_divisor: f64,
}

fn default_height_divisor() -> f64 {
    100.0
}

impl BmiRule {
    pub fn new(weight_column: impl Into<String>, height_column: impl Into<String>) -> Self {
        Self {
            weight_column: weight_column.into(),
            height_column: height_column.into(),
            height_divisor: default_height_divisor(),
        }
    }
}

/// Yes/no columns collapsed to 0/1.
///
/// Labels in `positive_labels` become 1 and labels in `negative_labels`
/// become 0. Any other value is parsed as a number; unparseable or missing
/// values become 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BinaryFlagRule {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub positive_labels: Vec<String>,
    #[serde(default)]
    pub negative_labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfRatedHealthRule {
    pub column: String,
    /// Label -> numeric rating (lower is better).
    #[serde(default)]
    pub scale: BTreeMap<String, f64>,
}

/// Public-health-system dependency: `plan == no_plan_value AND care == uses_care_value`.
///
/// The values refer to the coerced 0/1 flags, so both columns are expected
/// to be listed in [`BinaryFlagRule::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SusRule {
    pub plan_column: String,
    pub care_column: String,
    #[serde(default)]
    pub no_plan_value: i64,
    #[serde(default = "default_uses_care_value")]
    pub uses_care_value: i64,
}

fn default_uses_care_value() -> i64 {
    1
}

impl SusRule {
    pub fn new(plan_column: impl Into<String>, care_column: impl Into<String>) -> Self {
        Self {
            plan_column: plan_column.into(),
            care_column: care_column.into(),
            no_plan_value: 0,
            uses_care_value: default_uses_care_value(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCopy {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryVariable {
    pub label: String,
    pub column: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_optional_tables() {
        let profile: SurveyProfile = toml::from_str(
            r#"
            numeric_columns = ["idade"]

            [population]
            age_column = "idade"

            [derivations.sus]
            plan_column = "possui_plano_saude"
            care_column = "atendimento_sus"
            "#,
        )
        .unwrap();

        assert_eq!(profile.population.min_age, 60.0);
        let sus = profile.derivations.sus.unwrap();
        assert_eq!(sus.no_plan_value, 0);
        assert_eq!(sus.uses_care_value, 1);
        assert!(profile.derivations.bmi.is_none());
        assert!(profile.impute_columns.is_empty());
    }

    #[test]
    fn bmi_divisor_defaults_to_centimeters() {
        let rule: BmiRule =
            toml::from_str("weight_column = \"peso_real\"\nheight_column = \"altura\"").unwrap();
        assert_eq!(rule, BmiRule::new("peso_real", "altura"));
    }
}
