//! Nested-root normalization

use std::path::{Path, PathBuf};

/// Archive tools add this folder next to the real content
const MACOS_RESOURCE_DIR: &str = "__MACOSX";

/// The directory every later stage treats as the project root
///
/// When the materialized directory holds exactly one entry and that entry is
/// a directory, the content sits one level down and that subdirectory is
/// returned. Otherwise `materialized` is returned unchanged.
pub fn effective_root(materialized: &Path) -> PathBuf {
    let Ok(entries) = std::fs::read_dir(materialized) else {
        return materialized.to_path_buf();
    };

    let entries: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() != MACOS_RESOURCE_DIR)
        .take(2)
        .collect();

    match entries.as_slice() {
        [only] if only.file_type().is_ok_and(|t| t.is_dir()) => only.path(),
        _ => materialized.to_path_buf(),
    }
}
