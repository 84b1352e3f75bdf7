// Cache path utilities.
// Maps cache keys onto files under the on-disk cache directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Get the base cache directory (~/.cache/folio-api on Linux).
pub fn cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "folio-api").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path to the file holding a cache entry.
pub fn entry_path(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{}.json", sanitize_name(key)))
}

/// Sanitize a name for use in filesystem paths.
/// Replaces problematic characters with underscores.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '.' => '_',
            _ => c,
        })
        .collect()
}
