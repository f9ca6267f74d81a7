//! Field layouts for fixed-width survey records.
//!
//! A [`Layout`] maps a variable code to the byte range it occupies in every
//! record. Offsets are zero-based. Entries keep the order in which they were
//! first inserted so that "extract everything" output follows the source
//! layout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

/// Byte range of a single variable inside a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub code: String,
    /// Zero-based byte offset.
    pub start: usize,
    /// Field width in bytes, always positive.
    pub length: usize,
}

impl FieldSpec {
    pub fn new(code: impl Into<String>, start: usize, length: usize) -> Result<Self> {
        let code = code.into();
        if code.is_empty() {
            return Err(LayoutError::EmptyCode);
        }
        if length == 0 {
            return Err(LayoutError::NonPositiveLength { code, length: 0 });
        }
        Ok(Self {
            code,
            start,
            length,
        })
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// A manual correction for a known-wrong layout entry.
///
/// Values are signed so that a bad configuration is reported as a
/// [`LayoutError`] instead of failing to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOverride {
    pub code: String,
    /// Zero-based byte offset.
    pub offset: i64,
    pub length: i64,
}

impl PositionOverride {
    pub fn new(code: impl Into<String>, offset: i64, length: i64) -> Self {
        Self {
            code: code.into(),
            offset,
            length,
        }
    }

    pub fn to_field_spec(&self) -> Result<FieldSpec> {
        if self.length <= 0 {
            return Err(LayoutError::NonPositiveLength {
                code: self.code.clone(),
                length: self.length,
            });
        }
        if self.offset < 0 {
            return Err(LayoutError::NegativeOffset {
                code: self.code.clone(),
                offset: self.offset,
            });
        }
        // Both values were checked for sign above.
        FieldSpec::new(self.code.clone(), self.offset as usize, self.length as usize)
    }
}

/// Resolved offset table, keyed by variable code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<FieldSpec>,
    index: BTreeMap<String, usize>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous entry for the same code in place.
    pub fn insert(&mut self, spec: FieldSpec) {
        match self.index.get(&spec.code) {
            Some(&position) => self.fields[position] = spec,
            None => {
                self.index.insert(spec.code.clone(), self.fields.len());
                self.fields.push(spec);
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&FieldSpec> {
        self.index.get(code).map(|&position| &self.fields[position])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Apply manual corrections. An override always wins over a parsed entry.
    pub fn apply_overrides(&mut self, overrides: &[PositionOverride]) -> Result<usize> {
        for correction in overrides {
            self.insert(correction.to_field_spec()?);
        }
        Ok(overrides.len())
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Largest exclusive end offset over all fields (minimum record width).
    pub fn record_width(&self) -> usize {
        self.fields.iter().map(FieldSpec::end).max().unwrap_or(0)
    }

    /// `(start, end)` pairs in layout order, as used by fixed-width readers.
    pub fn colspecs(&self) -> Vec<(usize, usize)> {
        self.fields
            .iter()
            .map(|field| (field.start, field.end()))
            .collect()
    }
}

impl FromIterator<FieldSpec> for Layout {
    fn from_iter<T: IntoIterator<Item = FieldSpec>>(iter: T) -> Self {
        let mut layout = Layout::new();
        for spec in iter {
            layout.insert(spec);
        }
        layout
    }
}

/// One entry of the desired-column map: layout code and output column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredColumn {
    pub code: String,
    pub name: String,
}

/// Ordered code -> output-name map. Output columns follow this order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredColumns {
    entries: Vec<DesiredColumn>,
}

impl DesiredColumns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping. A repeated code keeps its first position and takes the new name.
    pub fn push(&mut self, code: impl Into<String>, name: impl Into<String>) {
        let code = code.into();
        let name = name.into();
        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.code == code) {
            existing.name = name;
        } else {
            self.entries.push(DesiredColumn { code, name });
        }
    }

    pub fn name_for(&self, code: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.code == code)
            .map(|entry| entry.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DesiredColumn> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identity mapping over every code of a layout.
    pub fn all_of(layout: &Layout) -> Self {
        layout.codes().map(|code| (code, code)).collect()
    }
}

impl<C: Into<String>, N: Into<String>> FromIterator<(C, N)> for DesiredColumns {
    fn from_iter<T: IntoIterator<Item = (C, N)>>(iter: T) -> Self {
        let mut columns = DesiredColumns::new();
        for (code, name) in iter {
            columns.push(code, name);
        }
        columns
    }
}
