//! Source file discovery shared by graph and component extraction

use crate::error::ParseFailure;
use crate::utils::{has_source_extension, is_excluded_name};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Source files found under a root, in a stable order
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    pub files: Vec<PathBuf>,
    /// More source files existed than the scan was allowed to visit
    pub truncated: bool,
}

/// Collect `{js,jsx,ts,tsx}` files under `root`, skipping `node_modules` and
/// dot-entries, visiting at most `max_files`
pub fn source_files(root: &Path, max_files: usize) -> SourceScan {
    let mut scan = SourceScan::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded_name(e.file_name()));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || !has_source_extension(entry.path()) {
            continue;
        }
        if scan.files.len() >= max_files {
            scan.truncated = true;
            break;
        }
        scan.files.push(entry.into_path());
    }

    scan
}

/// Read a source file, refusing files above `max_bytes`
pub fn read_source(path: &Path, max_bytes: u64) -> Result<String, ParseFailure> {
    let size = std::fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(ParseFailure::TooLarge(size));
    }
    Ok(std::fs::read_to_string(path)?)
}
