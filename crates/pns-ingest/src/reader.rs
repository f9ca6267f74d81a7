//! Line reading for fixed-width record files.
//!
//! Records are kept as raw bytes so that offsets are byte offsets, exactly
//! as the layout declares them, regardless of the text encoding.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Default number of records per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 50_000;

fn strip_line_ending(line: &mut Vec<u8>) {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
}

/// Iterator over fixed-size batches of record lines. Blank lines are skipped.
pub struct LineChunks<R> {
    reader: R,
    path: PathBuf,
    chunk_size: usize,
    finished: bool,
    blank_lines: usize,
}

impl<R: BufRead> LineChunks<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>, chunk_size: usize) -> Self {
        Self {
            reader,
            path: path.into(),
            chunk_size: chunk_size.max(1),
            finished: false,
            blank_lines: 0,
        }
    }

    /// Blank lines skipped so far.
    pub fn blank_lines(&self) -> usize {
        self.blank_lines
    }

    fn read_chunk(&mut self) -> Result<Vec<Vec<u8>>> {
        let mut lines = Vec::with_capacity(self.chunk_size.min(DEFAULT_CHUNK_SIZE));
        let mut skipped = 0usize;
        while lines.len() < self.chunk_size {
            let mut line = Vec::new();
            let read = self
                .reader
                .read_until(b'\n', &mut line)
                .map_err(|source| IngestError::read(&self.path, source))?;
            if read == 0 {
                self.finished = true;
                break;
            }
            strip_line_ending(&mut line);
            if line.is_empty() {
                skipped += 1;
            } else {
                lines.push(line);
            }
        }
        if skipped > 0 {
            self.blank_lines += skipped;
            tracing::debug!(
                path = %self.path.display(),
                skipped_lines = skipped,
                "blank lines skipped"
            );
        }
        Ok(lines)
    }
}

impl<R: BufRead> Iterator for LineChunks<R> {
    type Item = Result<Vec<Vec<u8>>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_chunk() {
            Ok(lines) if lines.is_empty() => None,
            Ok(lines) => Some(Ok(lines)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Open a record file for chunked reading.
pub fn open_chunks(path: &Path, chunk_size: usize) -> Result<LineChunks<BufReader<File>>> {
    let file = File::open(path).map_err(|source| IngestError::read(path, source))?;
    Ok(LineChunks::new(BufReader::new(file), path, chunk_size))
}

/// Read every record line of a file.
pub fn read_lines(path: &Path) -> Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    for chunk in open_chunks(path, DEFAULT_CHUNK_SIZE)? {
        lines.extend(chunk?);
    }
    tracing::debug!(path = %path.display(), record_count = lines.len(), "read records");
    Ok(lines)
}
