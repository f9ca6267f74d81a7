//! Plain-text column inventory written next to the table.

use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::error::{OutputError, Result};
use crate::writer::{WrittenFile, ensure_parent_dir};

const RULE_WIDTH: usize = 70;

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: usize) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render the inventory: title banner, record and column counts, then one
/// `name dtype` line per column.
pub fn render_inventory(df: &DataFrame, title: &str) -> String {
    let banner = "=".repeat(RULE_WIDTH);
    let mut out = format!("{banner}\n{title}\n{banner}\n\n");
    out.push_str(&format!("Registros: {}\n", group_thousands(df.height())));
    out.push_str(&format!("Colunas: {}\n\n", df.width()));
    out.push_str("COLUNAS:\n");
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
    for column in df.get_columns() {
        out.push_str(&format!("{:35} {}\n", column.name().as_str(), column.dtype()));
    }
    out
}

/// Sidecar path for a table: `<stem>_metadados.txt` in the same directory.
pub fn inventory_path(table_path: &Path) -> PathBuf {
    let stem = table_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("dataset");
    table_path.with_file_name(format!("{stem}_metadados.txt"))
}

/// Write the inventory for `df` next to `table_path`.
pub fn write_inventory(df: &DataFrame, table_path: &Path, title: &str) -> Result<WrittenFile> {
    let path = inventory_path(table_path);
    ensure_parent_dir(&path)?;
    let text = render_inventory(df, title);
    std::fs::write(&path, &text).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "column inventory written");
    Ok(WrittenFile {
        path,
        bytes: text.len() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(43554), "43,554");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn inventory_sits_next_to_table() {
        assert_eq!(
            inventory_path(Path::new("out/pns_2019_60mais.parquet")),
            PathBuf::from("out/pns_2019_60mais_metadados.txt")
        );
    }
}
