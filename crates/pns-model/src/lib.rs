//! Survey data model definitions.

pub mod error;
pub mod layout;
pub mod module;
pub mod profile;
pub mod recode;

pub use error::{LayoutError, MissingColumnError, Result};
pub use layout::{DesiredColumn, DesiredColumns, FieldSpec, Layout, PositionOverride};
pub use module::{SurveyModule, UnknownModule};
pub use profile::{
    BinaryFlagRule, BmiRule, ColumnCopy, DerivationProfile, PopulationRule, SelfRatedHealthRule,
    SummaryVariable, SurveyProfile, SusRule,
};
pub use recode::{RecodeTable, RecodeTables, normalize_code};
