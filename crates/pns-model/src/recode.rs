//! Categorical recode tables.
//!
//! Raw survey codes are zero-padded inconsistently (`"01"` vs `"1"`), so every
//! lookup goes through [`normalize_code`] first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Normalize a raw code for lookup: trim, strip leading zeros, and map the
/// empty result to `"0"`.
///
/// # Examples
///
/// ```
/// use pns_model::normalize_code;
///
/// assert_eq!(normalize_code("01"), "1");
/// assert_eq!(normalize_code("00"), "0");
/// assert_eq!(normalize_code(" 7 "), "7");
/// ```
pub fn normalize_code(raw: &str) -> &str {
    let stripped = raw.trim().trim_start_matches('0');
    if stripped.is_empty() { "0" } else { stripped }
}

/// Code -> label table for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecodeTable {
    entries: BTreeMap<String, String>,
}

impl RecodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a label. The code is stored normalized.
    pub fn insert(&mut self, code: impl Into<String>, label: impl Into<String>) {
        let code = code.into();
        self.entries
            .insert(normalize_code(&code).to_string(), label.into());
    }

    /// Label for a raw value, after normalization.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.entries
            .get(normalize_code(raw))
            .map(String::as_str)
    }

    /// Recode a raw value, keeping the original value when no label is registered.
    pub fn recode<'a>(&'a self, raw: &'a str) -> &'a str {
        self.lookup(raw).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(code, label)| (code.as_str(), label.as_str()))
    }
}

impl<C: Into<String>, L: Into<String>> FromIterator<(C, L)> for RecodeTable {
    fn from_iter<T: IntoIterator<Item = (C, L)>>(iter: T) -> Self {
        let mut table = RecodeTable::new();
        for (code, label) in iter {
            table.insert(code, label);
        }
        table
    }
}

/// Recode tables keyed by logical column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecodeTables {
    tables: BTreeMap<String, RecodeTable>,
}

impl RecodeTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_table(&mut self, column: impl Into<String>, table: RecodeTable) {
        self.tables.insert(column.into(), table);
    }

    /// Add a single entry, creating the column's table on first use.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
    ) {
        self.tables
            .entry(column.into())
            .or_default()
            .insert(code, label);
    }

    pub fn get(&self, column: &str) -> Option<&RecodeTable> {
        self.tables.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecodeTable)> {
        self.tables
            .iter()
            .map(|(column, table)| (column.as_str(), table))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Rename table keys (for example layout code -> output column name).
    /// Tables with no entry in `rename` are dropped.
    pub fn rekeyed<'a, F>(&self, mut rename: F) -> Self
    where
        F: FnMut(&str) -> Option<&'a str>,
    {
        let mut out = RecodeTables::new();
        for (key, table) in &self.tables {
            if let Some(name) = rename(key) {
                out.insert_table(name, table.clone());
            }
        }
        out
    }
}
