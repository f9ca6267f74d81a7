//! Progress reporting for chunked reads.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner style for chunk counters (total is unknown up front).
pub const CHUNK_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] {pos} chunks, {msg}";

/// A spinner counting processed chunks, hidden when stderr is not a terminal.
#[must_use]
pub fn chunk_progress(description: &str) -> ProgressBar {
    if !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template(CHUNK_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(description.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Record one finished chunk of `records` lines.
pub fn advance(pb: &ProgressBar, total_records: usize) {
    pb.inc(1);
    pb.set_message(format!("{total_records} records"));
}
