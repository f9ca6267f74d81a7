//! CLI library components for the PNS pipeline.

pub mod logging;
pub mod pipeline;
pub mod progress;
