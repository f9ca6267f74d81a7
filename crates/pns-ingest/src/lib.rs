//! Fixed-width survey ingestion.
//!
//! This crate turns the survey's published layout and raw microdata into
//! Polars DataFrames of trimmed string columns.
//!
//! # Features
//!
//! - **Layout Resolution**: Parse the SAS input program into zero-based offsets and apply overrides
//! - **Layout Dictionary**: Load the pre-processed variable dictionary CSV with category labels
//! - **Module Selection**: Pick every variable of one or more questionnaire modules
//! - **Record Extraction**: Slice raw byte lines into named columns, in memory or chunk by chunk
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pns_ingest::{ExtractionPlan, load_layout, read_lines, resolve_encoding};
//!
//! let encoding = resolve_encoding("latin1")?;
//! let layout = load_layout(Path::new("input_PNS_2019.sas"), encoding, &codebook.overrides)?;
//! let plan = ExtractionPlan::new(&layout, &codebook.desired);
//! let df = plan.extract(&read_lines(Path::new("PNS_2019.txt"))?, encoding)?;
//! ```

mod dictionary;
mod encoding;
mod error;
mod extract;
mod layout;
mod modules;
mod reader;

// === Error Types ===
pub use error::{IngestError, Result};

// === Encoding ===
pub use encoding::{decode, resolve_encoding};

// === Layout ===
pub use dictionary::{Dictionary, load_dictionary};
pub use layout::{load_layout, parse_layout, parse_layout_line, resolve_layout};
pub use modules::select_module_codes;

// === Extraction ===
pub use extract::{ExtractionPlan, PlannedField, extract_field, slice_field};
pub use reader::{DEFAULT_CHUNK_SIZE, LineChunks, open_chunks, read_lines};
