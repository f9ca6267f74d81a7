use thiserror::Error;

/// Malformed or contradictory layout entry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("field {code} has non-positive length {length}")]
    NonPositiveLength { code: String, length: i64 },

    #[error("field {code} has negative start offset {offset}")]
    NegativeOffset { code: String, offset: i64 },

    #[error("field code must not be empty")]
    EmptyCode,
}

/// A column required by an operation is absent from the table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("column '{column}' not found")]
pub struct MissingColumnError {
    pub column: String,
}

impl MissingColumnError {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LayoutError>;
