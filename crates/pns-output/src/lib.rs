//! Survey table export.
//!
//! - **Tables**: parquet (snappy) or CSV with a header row
//! - **Segments**: one `part-NNNN.parquet` file per extracted chunk
//! - **Inventory**: plain-text sidecar listing every column and its type

mod error;
mod sidecar;
mod writer;

pub use error::{OutputError, Result};
pub use sidecar::{group_thousands, inventory_path, render_inventory, write_inventory};
pub use writer::{OutputFormat, WrittenFile, segment_path, write_segment, write_table};
