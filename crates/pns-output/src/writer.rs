//! Table and segment writers.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use polars::prelude::*;
use serde::Serialize;

use crate::error::{OutputError, Result};

/// File format of the final table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Columnar, snappy-compressed.
    #[default]
    Parquet,
    /// Comma-separated with a header row.
    Csv,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Csv => "csv",
        }
    }

    /// Guess the format from a path extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(OutputError::UnknownFormat(other.to_string())),
        }
    }
}

/// A file written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}

fn create_file(path: &Path) -> Result<File> {
    ensure_parent_dir(path)?;
    File::create(path).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn file_size(path: &Path) -> Result<u64> {
    std::fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|source| OutputError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Write the table in the given format, creating parent directories.
pub fn write_table(df: &mut DataFrame, path: &Path, format: OutputFormat) -> Result<WrittenFile> {
    let mut file = create_file(path)?;
    match format {
        OutputFormat::Parquet => {
            ParquetWriter::new(file)
                .with_compression(ParquetCompression::Snappy)
                .finish(df)?;
        }
        OutputFormat::Csv => {
            CsvWriter::new(&mut file).include_header(true).finish(df)?;
        }
    }

    let written = WrittenFile {
        path: path.to_path_buf(),
        bytes: file_size(path)?,
    };
    tracing::info!(
        path = %path.display(),
        format = %format,
        record_count = df.height(),
        column_count = df.width(),
        bytes = written.bytes,
        "table written"
    );
    Ok(written)
}

/// Path of the `index`-th chunk segment inside `dir`.
pub fn segment_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("part-{index:04}.parquet"))
}

/// Persist one extracted chunk as `part-{index:04}.parquet`.
pub fn write_segment(df: &mut DataFrame, dir: &Path, index: usize) -> Result<WrittenFile> {
    let path = segment_path(dir, index);
    let file = create_file(&path)?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(df)?;

    let written = WrittenFile {
        bytes: file_size(&path)?,
        path,
    };
    tracing::debug!(
        chunk_index = index,
        record_count = df.height(),
        path = %written.path.display(),
        "segment written"
    );
    Ok(written)
}
