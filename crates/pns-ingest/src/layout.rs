//! SAS `INPUT` layout parsing.
//!
//! The survey publishes its record layout as a SAS input program where each
//! field is declared as `@<5-digit 1-based offset> <code> <length>`, for
//! example `@00602 P00402 $3.` or `@00047 V00291 14.8`. Lines that do not
//! declare a field are skipped.

use std::path::Path;
use std::sync::LazyLock;

use encoding_rs::Encoding;
use regex::Regex;

use pns_model::{FieldSpec, Layout, PositionOverride};

use crate::encoding::decode;
use crate::error::{IngestError, Result};

static FIELD_DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(\d{5})\s*(\w+)\s*(\$?\d+(?:\.\d*)?)").expect("Invalid layout regex")
});

/// Parse one layout line into a zero-based field spec.
///
/// The decimal part of a numeric length (`14.8`) only describes implied
/// decimals and is ignored for sizing.
pub fn parse_layout_line(line: &str) -> Option<FieldSpec> {
    let captures = FIELD_DECLARATION.captures(line)?;
    let position: usize = captures[1].parse().ok()?;
    let start = position.checked_sub(1)?;
    let length_token = captures[3].trim_start_matches('$');
    let length: usize = length_token.split('.').next()?.parse().ok()?;
    FieldSpec::new(&captures[2], start, length).ok()
}

/// Parse every field declaration of a layout text. Later declarations of
/// the same code replace earlier ones.
pub fn parse_layout(text: &str) -> Layout {
    text.lines().filter_map(parse_layout_line).collect()
}

/// Parse a layout and apply the position overrides on top.
pub fn resolve_layout(text: &str, overrides: &[PositionOverride]) -> Result<Layout> {
    let mut layout = parse_layout(text);
    let parsed = layout.len();
    layout.apply_overrides(overrides)?;
    tracing::debug!(
        field_count = parsed,
        override_count = overrides.len(),
        "resolved layout"
    );
    Ok(layout)
}

/// Read a layout file in the survey's legacy encoding and resolve it.
pub fn load_layout(
    path: &Path,
    encoding: &'static Encoding,
    overrides: &[PositionOverride],
) -> Result<Layout> {
    let bytes = std::fs::read(path).map_err(|source| IngestError::read(path, source))?;
    let text = decode(encoding, &bytes);
    let layout = resolve_layout(&text, overrides)?;
    tracing::info!(
        path = %path.display(),
        field_count = layout.len(),
        record_width = layout.record_width(),
        "loaded layout"
    );
    Ok(layout)
}
