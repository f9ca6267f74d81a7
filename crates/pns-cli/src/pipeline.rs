//! Survey processing pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Layout**: resolve field offsets from the SAS layout or the dictionary CSV
//! 2. **Extract**: slice raw records into string columns, in memory or chunk by chunk
//! 3. **Transform**: coerce, filter the 60+ population, recode, derive, impute
//! 4. **Export**: write the table and its column inventory
//!
//! Dataset-wide statistics are only computed once every chunk has been
//! concatenated, so both execution strategies produce the same table.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use indicatif::ProgressBar;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use pns_codebook::Codebook;
use pns_ingest::{ExtractionPlan, load_dictionary, load_layout, open_chunks, read_lines};
use pns_model::{Layout, PositionOverride, RecodeTables, SurveyProfile};
use pns_output::{OutputFormat, WrittenFile, write_inventory, write_segment, write_table};
use pns_transform::{
    CoercionReport, DerivationReport, FilterReport, ImputeReport, RecodeReport,
    apply_recode_tables, coerce_numeric, derive_indicators, filter_population, impute_median,
};

use crate::progress::advance;

// ============================================================================
// Stage 1: Layout
// ============================================================================

/// Where field offsets come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutSource {
    /// SAS input program.
    Sas(PathBuf),
    /// Layout dictionary CSV, which also carries category labels.
    Dictionary(PathBuf),
}

impl LayoutSource {
    pub fn path(&self) -> &Path {
        match self {
            LayoutSource::Sas(path) | LayoutSource::Dictionary(path) => path,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LayoutSource::Sas(_) => "sas",
            LayoutSource::Dictionary(_) => "dictionary",
        }
    }
}

/// Offsets plus any category labels that came with them (keyed by code).
#[derive(Debug, Clone, Default)]
pub struct ResolvedLayout {
    pub layout: Layout,
    pub labels: RecodeTables,
}

/// Load the layout and apply the position overrides.
pub fn resolve_layout_source(
    source: &LayoutSource,
    encoding: &'static Encoding,
    overrides: &[PositionOverride],
) -> Result<ResolvedLayout> {
    match source {
        LayoutSource::Sas(path) => {
            let layout = load_layout(path, encoding, overrides)
                .with_context(|| format!("load layout {}", path.display()))?;
            Ok(ResolvedLayout {
                layout,
                labels: RecodeTables::new(),
            })
        }
        LayoutSource::Dictionary(path) => {
            let dictionary = load_dictionary(path)
                .with_context(|| format!("load dictionary {}", path.display()))?;
            let mut layout = dictionary.layout;
            layout
                .apply_overrides(overrides)
                .with_context(|| format!("apply overrides to {}", path.display()))?;
            Ok(ResolvedLayout {
                layout,
                labels: dictionary.labels,
            })
        }
    }
}

/// Recode tables keyed by output column name.
///
/// Codebook tables come first; dictionary labels fill in columns the
/// codebook has no table for.
pub fn merge_recode_tables(codebook: &Codebook, resolved: &ResolvedLayout) -> RecodeTables {
    let mut tables = codebook.recodes.clone();
    let from_dictionary = resolved
        .labels
        .rekeyed(|code| codebook.desired.name_for(code));
    let mut added = 0usize;
    for (column, table) in from_dictionary.iter() {
        if tables.get(column).is_none() {
            tables.insert_table(column, table.clone());
            added += 1;
        }
    }
    if added > 0 {
        debug!(table_count = added, "added dictionary recode tables");
    }
    tables
}

// ============================================================================
// Stage 2: Extract
// ============================================================================

/// How records are read and sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionStrategy {
    /// Read every line, extract once.
    InMemory,
    /// Extract `chunk_size` lines at a time, then concatenate.
    Chunked { chunk_size: usize },
}

impl fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStrategy::InMemory => f.write_str("in-memory"),
            ExecutionStrategy::Chunked { chunk_size } => write!(f, "chunked({chunk_size})"),
        }
    }
}

/// Result of the extract stage.
#[derive(Debug)]
pub struct ExtractResult {
    pub data: DataFrame,
    pub chunk_count: usize,
    /// Segments persisted along the way (chunked strategy with a segments dir).
    pub segments: Vec<WrittenFile>,
}

/// Read `input` chunk by chunk, handing each extracted chunk to `on_chunk`.
///
/// Returns the number of chunks read.
pub fn for_each_chunk<F>(
    input: &Path,
    plan: &ExtractionPlan,
    encoding: &'static Encoding,
    chunk_size: usize,
    progress: &ProgressBar,
    mut on_chunk: F,
) -> Result<usize>
where
    F: FnMut(usize, DataFrame) -> Result<()>,
{
    let mut chunk_count = 0usize;
    let mut record_count = 0usize;
    for (index, lines) in open_chunks(input, chunk_size)?.enumerate() {
        let lines = lines.with_context(|| format!("read chunk {index}"))?;
        let chunk = plan
            .extract(&lines, encoding)
            .with_context(|| format!("extract chunk {index}"))?;
        record_count += chunk.height();
        debug!(chunk_index = index, record_count = chunk.height(), "chunk extracted");
        on_chunk(index, chunk)?;
        chunk_count += 1;
        advance(progress, record_count);
    }
    Ok(chunk_count)
}

/// Extract the planned fields from every record of `input`.
pub fn extract_records(
    input: &Path,
    plan: &ExtractionPlan,
    encoding: &'static Encoding,
    strategy: ExecutionStrategy,
    segments_dir: Option<&Path>,
    progress: &ProgressBar,
) -> Result<ExtractResult> {
    match strategy {
        ExecutionStrategy::InMemory => {
            if segments_dir.is_some() {
                warn!("segments are only written by the chunked strategy");
            }
            let lines = read_lines(input).with_context(|| format!("read {}", input.display()))?;
            let data = plan.extract(&lines, encoding).context("extract records")?;
            advance(progress, data.height());
            Ok(ExtractResult {
                data,
                chunk_count: 1,
                segments: Vec::new(),
            })
        }
        ExecutionStrategy::Chunked { chunk_size } => {
            let empty: &[Vec<u8>] = &[];
            let mut data = plan.extract(empty, encoding).context("extract records")?;
            let mut segments = Vec::new();
            let chunk_count =
                for_each_chunk(input, plan, encoding, chunk_size, progress, |index, mut chunk| {
                    if let Some(dir) = segments_dir {
                        segments.push(
                            write_segment(&mut chunk, dir, index)
                                .with_context(|| format!("write segment {index}"))?,
                        );
                    }
                    data.vstack_mut(&chunk)
                        .with_context(|| format!("append chunk {index}"))?;
                    Ok(())
                })?;
            Ok(ExtractResult {
                data,
                chunk_count,
                segments,
            })
        }
    }
}

// ============================================================================
// Stage 3: Transform
// ============================================================================

/// Counts reported by each transform step.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransformReport {
    pub coercion: CoercionReport,
    pub population: FilterReport,
    pub recode: RecodeReport,
    pub derivations: DerivationReport,
    pub imputation: ImputeReport,
}

/// Coerce, filter, recode, derive and impute, in that order.
pub fn transform(
    df: &mut DataFrame,
    profile: &SurveyProfile,
    recodes: &RecodeTables,
) -> Result<TransformReport> {
    let start = Instant::now();
    let coercion = info_span!("coerce").in_scope(|| coerce_numeric(df, &profile.numeric_columns))?;
    if coercion.total_failures() > 0 {
        warn!(
            failure_count = coercion.total_failures(),
            column_count = coercion.failures.len(),
            "values could not be parsed as numbers"
        );
    }

    let population = info_span!("filter", min_age = profile.population.min_age)
        .in_scope(|| filter_population(df, &profile.population))
        .context("filter population")?;
    info!(
        before = population.before,
        after = population.after,
        removed = population.removed(),
        "population filtered"
    );

    let recode = info_span!("recode").in_scope(|| apply_recode_tables(df, recodes))?;
    let derivations =
        info_span!("derive").in_scope(|| derive_indicators(df, &profile.derivations))?;
    let imputation = info_span!("impute").in_scope(|| impute_median(df, &profile.impute_columns))?;

    info!(
        record_count = df.height(),
        column_count = df.width(),
        recoded_columns = recode.columns,
        derivations_applied = derivations.applied_count(),
        derivations_skipped = derivations.skipped_count(),
        imputed = imputation.total(),
        duration_ms = start.elapsed().as_millis(),
        "transform complete"
    );

    Ok(TransformReport {
        coercion,
        population,
        recode,
        derivations,
        imputation,
    })
}

// ============================================================================
// Stage 4: Export
// ============================================================================

/// Files produced by the export stage.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub table: WrittenFile,
    pub inventory: Option<WrittenFile>,
}

/// Write the table and, when `inventory_title` is given, its column inventory.
pub fn export(
    df: &mut DataFrame,
    path: &Path,
    format: OutputFormat,
    inventory_title: Option<&str>,
) -> Result<ExportResult> {
    let table =
        write_table(df, path, format).with_context(|| format!("write {}", path.display()))?;
    let inventory = match inventory_title {
        Some(title) => Some(
            write_inventory(df, path, title)
                .with_context(|| format!("write inventory for {}", path.display()))?,
        ),
        None => None,
    };
    Ok(ExportResult { table, inventory })
}

// ============================================================================
// Whole run
// ============================================================================

/// Inputs of a full run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub source: LayoutSource,
    pub strategy: ExecutionStrategy,
    pub segments_dir: Option<PathBuf>,
}

/// The final table and everything reported while building it.
#[derive(Debug)]
pub struct ProcessedTable {
    pub data: DataFrame,
    pub extracted_records: usize,
    pub extracted_columns: usize,
    pub chunk_count: usize,
    pub segments: Vec<WrittenFile>,
    pub missing_codes: Vec<String>,
    pub report: TransformReport,
}

/// Run stages 1 to 3.
pub fn process(
    config: &RunConfig,
    codebook: &Codebook,
    progress: &ProgressBar,
) -> Result<ProcessedTable> {
    let encoding = pns_ingest::resolve_encoding(&codebook.survey.encoding)?;

    let resolved = info_span!("layout", source = config.source.kind()).in_scope(|| {
        resolve_layout_source(&config.source, encoding, &codebook.overrides)
    })?;
    let plan = ExtractionPlan::new(&resolved.layout, &codebook.desired);
    let recodes = merge_recode_tables(codebook, &resolved);

    let extract_span = info_span!(
        "extract",
        input = %config.input.display(),
        strategy = %config.strategy
    );
    let extract_start = Instant::now();
    let extracted = extract_span.in_scope(|| {
        extract_records(
            &config.input,
            &plan,
            encoding,
            config.strategy,
            config.segments_dir.as_deref(),
            progress,
        )
    })?;
    info!(
        record_count = extracted.data.height(),
        column_count = extracted.data.width(),
        chunk_count = extracted.chunk_count,
        missing_codes = plan.missing_codes().len(),
        duration_ms = extract_start.elapsed().as_millis(),
        "extract complete"
    );

    let ExtractResult {
        mut data,
        chunk_count,
        segments,
    } = extracted;
    let extracted_records = data.height();
    let extracted_columns = data.width();
    let report = transform(&mut data, &codebook.profile, &recodes)?;

    Ok(ProcessedTable {
        data,
        extracted_records,
        extracted_columns,
        chunk_count,
        segments,
        missing_codes: plan.missing_codes().to_vec(),
        report,
    })
}
