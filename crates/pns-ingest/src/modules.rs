//! Variable selection by questionnaire module.

use pns_model::{Layout, SurveyModule};

use crate::error::{IngestError, Result};

/// Every layout code that belongs to one of the given modules, in layout order.
pub fn select_module_codes(layout: &Layout, modules: &[SurveyModule]) -> Result<Vec<String>> {
    if modules.is_empty() {
        return Err(IngestError::EmptyModuleSelection);
    }
    let codes: Vec<String> = layout
        .codes()
        .filter(|code| modules.iter().any(|module| module.matches(code)))
        .map(str::to_string)
        .collect();
    tracing::debug!(
        module_count = modules.len(),
        code_count = codes.len(),
        "selected module variables"
    );
    Ok(codes)
}
