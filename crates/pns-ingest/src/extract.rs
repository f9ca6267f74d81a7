//! Fixed-width record extraction.

use encoding_rs::Encoding;
use polars::prelude::*;

use pns_model::{DesiredColumns, Layout};

use crate::encoding::decode;
use crate::error::Result;

/// A desired column resolved against the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedField {
    pub code: String,
    pub name: String,
    pub start: usize,
    pub length: usize,
}

/// Which byte ranges to cut out of each record and what to call them.
///
/// Desired codes absent from the layout are kept aside in
/// [`missing_codes`](Self::missing_codes) and left out of the output.
#[derive(Debug, Clone, Default)]
pub struct ExtractionPlan {
    fields: Vec<PlannedField>,
    missing: Vec<String>,
}

impl ExtractionPlan {
    pub fn new(layout: &Layout, desired: &DesiredColumns) -> Self {
        let mut plan = Self::default();
        for column in desired.iter() {
            match layout.get(&column.code) {
                Some(spec) => plan.fields.push(PlannedField {
                    code: column.code.clone(),
                    name: column.name.clone(),
                    start: spec.start,
                    length: spec.length,
                }),
                None => plan.missing.push(column.code.clone()),
            }
        }
        if !plan.missing.is_empty() {
            tracing::warn!(
                missing_count = plan.missing.len(),
                missing_codes = %plan.missing.join(","),
                "desired codes not found in layout"
            );
        }
        plan
    }

    /// Every layout field, named by its code.
    pub fn all(layout: &Layout) -> Self {
        Self::new(layout, &DesiredColumns::all_of(layout))
    }

    /// The given codes, named by themselves.
    pub fn for_codes<S: AsRef<str>>(layout: &Layout, codes: &[S]) -> Self {
        let desired: DesiredColumns = codes
            .iter()
            .map(|code| (code.as_ref(), code.as_ref()))
            .collect();
        Self::new(layout, &desired)
    }

    pub fn fields(&self) -> &[PlannedField] {
        &self.fields
    }

    pub fn missing_codes(&self) -> &[String] {
        &self.missing
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Cut every planned field out of each line.
    ///
    /// Produces one string column per planned field, in plan order. Short
    /// lines read as blank padding and blank fields become null.
    pub fn extract<L: AsRef<[u8]>>(
        &self,
        lines: &[L],
        encoding: &'static Encoding,
    ) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .fields
            .iter()
            .map(|field| {
                let values: Vec<Option<String>> = lines
                    .iter()
                    .map(|line| extract_field(line.as_ref(), field.start, field.length, encoding))
                    .collect();
                Column::new(field.name.as_str().into(), values)
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

/// The bytes of `line` in `[start, start + length)`, clamped to the line.
pub fn slice_field(line: &[u8], start: usize, length: usize) -> &[u8] {
    let end = start.saturating_add(length).min(line.len());
    line.get(start..end).unwrap_or_default()
}

/// Decode and trim one field; `None` when the field is blank.
pub fn extract_field(
    line: &[u8],
    start: usize,
    length: usize,
    encoding: &'static Encoding,
) -> Option<String> {
    let text = decode(encoding, slice_field(line, start, length));
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use pns_model::FieldSpec;

    #[test]
    fn slice_is_clamped_to_line() {
        assert_eq!(slice_field(b"abcdef", 2, 3), b"cde");
        assert_eq!(slice_field(b"abcdef", 4, 10), b"ef");
        assert_eq!(slice_field(b"abc", 5, 2), b"");
    }

    #[test]
    fn blank_field_is_null() {
        assert_eq!(extract_field(b"12   9", 2, 3, WINDOWS_1252), None);
        assert_eq!(
            extract_field(b"12 7 9", 2, 3, WINDOWS_1252),
            Some("7".to_string())
        );
    }

    #[test]
    fn plan_reports_missing_codes() {
        let layout: Layout = [FieldSpec::new("C008", 0, 3).unwrap()].into_iter().collect();
        let desired: DesiredColumns = [("C008", "idade"), ("ZZZ9", "ausente")]
            .into_iter()
            .collect();

        let plan = ExtractionPlan::new(&layout, &desired);

        assert_eq!(plan.column_names().collect::<Vec<_>>(), vec!["idade"]);
        assert_eq!(plan.missing_codes(), ["ZZZ9".to_string()]);
    }
}
