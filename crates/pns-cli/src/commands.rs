use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use pns_cli::pipeline::{
    ExecutionStrategy, LayoutSource, RunConfig, export, for_each_chunk, process,
    resolve_layout_source,
};
use pns_cli::progress::chunk_progress;
use pns_codebook::{Codebook, load_codebook, load_default_codebook};
use pns_ingest::{ExtractionPlan, resolve_encoding, select_module_codes};
use pns_model::SurveyModule;
use pns_output::{OutputFormat, write_segment};
use pns_transform::summarize;

use crate::cli::{ExtractArgs, FormatArg, LayoutArgs, LayoutSourceArgs, RunArgs, StrategyArg};
use crate::types::{ExtractSummary, LayoutRow, RunSummary};

pub fn run_pipeline(args: &RunArgs) -> Result<RunSummary> {
    let start = Instant::now();
    let codebook = load_codebook_arg(args.codebook.as_deref())?;
    let run_span = info_span!("run", survey = %codebook.survey.name);
    let _run_guard = run_span.enter();

    let strategy = match args.strategy {
        StrategyArg::InMemory => ExecutionStrategy::InMemory,
        StrategyArg::Chunked => ExecutionStrategy::Chunked {
            chunk_size: args.chunk_size.unwrap_or(codebook.survey.chunk_size),
        },
    };
    let config = RunConfig {
        input: args.input.clone(),
        source: layout_source(&args.source)?,
        strategy,
        segments_dir: args.segments_dir.clone(),
    };

    let progress = chunk_progress("reading records");
    let processed = process(&config, &codebook, &progress);
    progress.finish_and_clear();
    let mut processed = processed?;

    let statistics = summarize(&processed.data, &codebook.profile.summary)
        .context("summarize variables")?;

    let format = output_format(args.format, &args.output);
    let export_span = info_span!("export", path = %args.output.display(), format = %format);
    let export_start = Instant::now();
    let inventory_title = (!args.no_metadata).then(|| codebook.title());
    let output = export_span
        .in_scope(|| export(&mut processed.data, &args.output, format, inventory_title))?;
    info!(
        record_count = processed.data.height(),
        bytes = output.table.bytes,
        duration_ms = export_start.elapsed().as_millis(),
        "export complete"
    );

    let summary = RunSummary {
        survey: codebook.survey.name.clone(),
        input: args.input.clone(),
        layout_source: config.source.kind().to_string(),
        strategy,
        chunk_count: processed.chunk_count,
        extracted_records: processed.extracted_records,
        extracted_columns: processed.extracted_columns,
        missing_codes: processed.missing_codes,
        final_records: processed.data.height(),
        final_columns: processed.data.width(),
        transform: processed.report,
        statistics,
        output,
        segments: processed.segments,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    };

    if let Some(path) = &args.report_json {
        write_report(&summary, path)?;
    }
    info!(duration_ms = summary.duration_ms, "run complete");
    Ok(summary)
}

pub fn run_extract(args: &ExtractArgs) -> Result<ExtractSummary> {
    let start = Instant::now();
    let codebook = load_codebook_arg(args.codebook.as_deref())?;
    let encoding = resolve_encoding(&codebook.survey.encoding)?;
    let source = layout_source(&args.source)?;
    let resolved = resolve_layout_source(&source, encoding, &codebook.overrides)?;

    let modules = args
        .modules
        .iter()
        .map(|prefix| prefix.parse::<SurveyModule>())
        .collect::<Result<Vec<_>, _>>()
        .context("parse --module")?;
    let plan = if modules.is_empty() {
        ExtractionPlan::all(&resolved.layout)
    } else {
        let codes = select_module_codes(&resolved.layout, &modules)?;
        if codes.is_empty() {
            warn!(module_count = modules.len(), "no layout codes match the selected modules");
        }
        ExtractionPlan::for_codes(&resolved.layout, &codes)
    };

    let chunk_size = args.chunk_size.unwrap_or(codebook.survey.chunk_size);
    let extract_span = info_span!(
        "extract",
        input = %args.input.display(),
        out_dir = %args.out_dir.display(),
        chunk_size
    );
    let _extract_guard = extract_span.enter();

    let progress = chunk_progress("writing segments");
    let mut segments = Vec::new();
    let mut record_count = 0usize;
    let result = for_each_chunk(
        &args.input,
        &plan,
        encoding,
        chunk_size,
        &progress,
        |index, mut chunk| {
            record_count += chunk.height();
            segments.push(write_segment(&mut chunk, &args.out_dir, index)?);
            Ok(())
        },
    );
    progress.finish_and_clear();
    let chunk_count = result?;

    info!(
        chunk_count,
        record_count,
        column_count = plan.len(),
        duration_ms = start.elapsed().as_millis(),
        "extract complete"
    );
    Ok(ExtractSummary {
        input: args.input.clone(),
        out_dir: args.out_dir.clone(),
        modules: modules.iter().map(|module| module.prefix().to_string()).collect(),
        record_count,
        column_count: plan.len(),
        segments,
    })
}

pub fn run_layout(args: &LayoutArgs) -> Result<Vec<LayoutRow>> {
    let codebook = load_codebook_arg(args.codebook.as_deref())?;
    let encoding = resolve_encoding(&codebook.survey.encoding)?;
    let source = layout_source(&args.source)?;
    let resolved = resolve_layout_source(&source, encoding, &codebook.overrides)?;
    Ok(codebook
        .desired
        .iter()
        .map(|column| LayoutRow {
            code: column.code.clone(),
            name: column.name.clone(),
            field: resolved.layout.get(&column.code).cloned(),
        })
        .collect())
}

fn load_codebook_arg(dir: Option<&Path>) -> Result<Codebook> {
    match dir {
        Some(dir) => load_codebook(dir).with_context(|| format!("load codebook {}", dir.display())),
        None => load_default_codebook().context("load default codebook"),
    }
}

fn layout_source(args: &LayoutSourceArgs) -> Result<LayoutSource> {
    match (&args.layout, &args.dictionary) {
        (Some(path), None) => Ok(LayoutSource::Sas(path.clone())),
        (None, Some(path)) => Ok(LayoutSource::Dictionary(path.clone())),
        _ => bail!("exactly one of --layout or --dictionary is required"),
    }
}

fn output_format(arg: Option<FormatArg>, path: &Path) -> OutputFormat {
    match arg {
        Some(FormatArg::Parquet) => OutputFormat::Parquet,
        Some(FormatArg::Csv) => OutputFormat::Csv,
        None => OutputFormat::from_path(path).unwrap_or_default(),
    }
}

fn write_report(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(summary).context("serialize run report")?;
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), "run report written");
    Ok(())
}
