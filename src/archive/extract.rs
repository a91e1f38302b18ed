//! ZIP extraction into a project directory

use super::validate::{map_io_error, map_zip_error};
use crate::error::AnalysisError;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Component, Path};
use zip::ZipArchive;

const NODE_MODULES: &str = "node_modules";
const SYMLINK_MODE_MASK: u32 = 0o170000;
const SYMLINK_MODE: u32 = 0o120000;

/// Outcome of an extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub files_written: usize,
    pub entries_skipped: usize,
}

/// Extract every entry of `zip_path` into `target`, overwriting existing files
///
/// Entries that would land outside `target`, symlinks and anything under a
/// `node_modules` directory are skipped. Writing stops with
/// `ResourceExhausted` once more than `max_bytes` have been written.
pub fn extract_archive(
    zip_path: &Path,
    target: &Path,
    max_bytes: u64,
) -> Result<ExtractionReport, AnalysisError> {
    if !zip_path.exists() {
        return Err(AnalysisError::NotFound(zip_path.to_path_buf()));
    }

    fs::create_dir_all(target).map_err(|e| map_io_error(e, zip_path))?;

    let file = File::open(zip_path).map_err(|e| map_io_error(e, zip_path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| map_zip_error(e, zip_path))?;

    let mut report = ExtractionReport::default();
    let mut written = 0u64;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| map_zip_error(e, zip_path))?;

        let Some(relative) = entry.enclosed_name() else {
            report.entries_skipped += 1;
            continue;
        };
        let is_symlink = entry
            .unix_mode()
            .is_some_and(|mode| mode & SYMLINK_MODE_MASK == SYMLINK_MODE);
        if is_symlink || is_under_node_modules(&relative) {
            report.entries_skipped += 1;
            continue;
        }

        let out_path = target.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| map_io_error(e, zip_path))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| map_io_error(e, zip_path))?;
        }

        let remaining = max_bytes.saturating_sub(written);
        let mut out_file = File::create(&out_path).map_err(|e| map_io_error(e, zip_path))?;
        let mut limited = entry.by_ref().take(remaining.saturating_add(1));
        let copied =
            std::io::copy(&mut limited, &mut out_file).map_err(|e| map_io_error(e, zip_path))?;
        written += copied;
        if written > max_bytes {
            return Err(AnalysisError::ResourceExhausted(format!(
                "ZIP expands beyond the allowed {max_bytes} bytes"
            )));
        }
        report.files_written += 1;
    }

    remove_node_modules(target).map_err(|e| map_io_error(e, zip_path))?;

    Ok(report)
}

/// Delete a top-level `node_modules` directory left in `root`
pub fn remove_node_modules(root: &Path) -> std::io::Result<bool> {
    let node_modules = root.join(NODE_MODULES);
    if node_modules.is_dir() {
        fs::remove_dir_all(&node_modules)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

fn is_under_node_modules(relative: &Path) -> bool {
    relative
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == NODE_MODULES))
}
