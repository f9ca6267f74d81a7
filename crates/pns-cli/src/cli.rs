//! CLI argument definitions for the PNS pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "pns",
    version,
    about = "PNS microdata pipeline - fixed-width survey records to analysis-ready tables",
    long_about = "Extract, filter and enrich PNS 2019 microdata.\n\n\
                  Reads the fixed-width records with the published SAS input layout\n\
                  (or a layout dictionary CSV), keeps respondents aged 60 or more,\n\
                  recodes categorical answers and derives health indicators."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline and write the final table.
    Run(RunArgs),

    /// Persist raw extracted chunks as parquet segments.
    Extract(ExtractArgs),

    /// Show the resolved field offsets for the desired columns.
    Layout(LayoutArgs),

    /// List the questionnaire modules.
    Modules,
}

/// Where field offsets come from.
#[derive(Args, Clone)]
#[group(required = true, multiple = false)]
pub struct LayoutSourceArgs {
    /// SAS input program with `@offset CODE length.` entries.
    #[arg(long = "layout", value_name = "SAS")]
    pub layout: Option<PathBuf>,

    /// Layout dictionary CSV (code, start position, length, categories).
    #[arg(long = "dictionary", value_name = "CSV")]
    pub dictionary: Option<PathBuf>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Fixed-width microdata file.
    #[arg(long = "input", value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub source: LayoutSourceArgs,

    /// Output table path.
    #[arg(long = "output", value_name = "FILE")]
    pub output: PathBuf,

    /// Output format (default: from the output extension, else parquet).
    #[arg(long = "format", value_enum)]
    pub format: Option<FormatArg>,

    /// Codebook directory (default: $PNS_CODEBOOK_DIR or the bundled one).
    #[arg(long = "codebook", value_name = "DIR")]
    pub codebook: Option<PathBuf>,

    /// How records are read and extracted.
    #[arg(long = "strategy", value_enum, default_value = "in-memory")]
    pub strategy: StrategyArg,

    /// Lines per chunk for the chunked strategy (default: from the codebook).
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Also persist every extracted chunk here (chunked strategy only).
    #[arg(long = "segments-dir", value_name = "DIR")]
    pub segments_dir: Option<PathBuf>,

    /// Skip the column inventory sidecar.
    #[arg(long = "no-metadata")]
    pub no_metadata: bool,

    /// Write the run summary as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Fixed-width microdata file.
    #[arg(long = "input", value_name = "FILE")]
    pub input: PathBuf,

    #[command(flatten)]
    pub source: LayoutSourceArgs,

    /// Directory receiving `part-NNNN.parquet` segments.
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Lines per chunk (default: from the codebook).
    #[arg(long = "chunk-size", value_name = "N")]
    pub chunk_size: Option<usize>,

    /// Only extract variables of these modules (repeatable, e.g. `--module C --module VD`).
    #[arg(long = "module", value_name = "PREFIX")]
    pub modules: Vec<String>,

    /// Codebook directory (default: $PNS_CODEBOOK_DIR or the bundled one).
    #[arg(long = "codebook", value_name = "DIR")]
    pub codebook: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LayoutArgs {
    #[command(flatten)]
    pub source: LayoutSourceArgs,

    /// Codebook directory (default: $PNS_CODEBOOK_DIR or the bundled one).
    #[arg(long = "codebook", value_name = "DIR")]
    pub codebook: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Parquet,
    Csv,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    InMemory,
    Chunked,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
