//! Codebook directory resolution.

use std::path::PathBuf;

/// Environment variable for overriding the codebook directory.
pub const CODEBOOK_ENV_VAR: &str = "PNS_CODEBOOK_DIR";

/// Name of the manifest file inside a codebook directory.
pub const MANIFEST_FILE: &str = "survey.toml";

/// Get the codebook root directory.
///
/// Resolution order:
/// 1. `PNS_CODEBOOK_DIR` environment variable
/// 2. `codebook/` directory relative to workspace root
pub fn codebook_root() -> PathBuf {
    if let Ok(root) = std::env::var(CODEBOOK_ENV_VAR) {
        return PathBuf::from(root);
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../codebook")
}

/// Bundled PNS 2019 codebook.
pub fn default_codebook_dir() -> PathBuf {
    let root = codebook_root();
    if root.join(MANIFEST_FILE).is_file() {
        root
    } else {
        root.join("pns2019")
    }
}
