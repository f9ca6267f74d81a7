use std::path::PathBuf;

use serde::Serialize;

use pns_model::FieldSpec;
use pns_output::WrittenFile;
use pns_transform::VariableSummary;

use pns_cli::pipeline::{ExecutionStrategy, ExportResult, TransformReport};

/// Everything reported by `pns run`; also the `--report-json` document.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub survey: String,
    pub input: PathBuf,
    pub layout_source: String,
    pub strategy: ExecutionStrategy,
    pub chunk_count: usize,
    pub extracted_records: usize,
    pub extracted_columns: usize,
    pub missing_codes: Vec<String>,
    pub final_records: usize,
    pub final_columns: usize,
    #[serde(flatten)]
    pub transform: TransformReport,
    pub statistics: Vec<VariableSummary>,
    pub output: ExportResult,
    pub segments: Vec<WrittenFile>,
    pub duration_ms: u64,
}

#[derive(Debug)]
pub struct ExtractSummary {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub modules: Vec<String>,
    pub record_count: usize,
    pub column_count: usize,
    pub segments: Vec<WrittenFile>,
}

/// One desired column and where (if anywhere) the layout puts it.
#[derive(Debug)]
pub struct LayoutRow {
    pub code: String,
    pub name: String,
    pub field: Option<FieldSpec>,
}
