//! Archive pre-validation against boundary limits
//!
//! Runs before anything is written to disk. The check only reads the central
//! directory, so it stays cheap even for archives that would be expensive to
//! extract.

use crate::config::Limits;
use crate::error::AnalysisError;
use std::fs::File;
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::result::ZipError;

/// Summary of an archive that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub file_count: usize,
    pub archive_bytes: u64,
    pub uncompressed_bytes: u64,
}

/// Check an archive against the configured limits without extracting it
pub fn inspect_archive(zip_path: &Path, limits: &Limits) -> Result<ArchiveReport, AnalysisError> {
    let metadata = std::fs::metadata(zip_path).map_err(|e| map_io_error(e, zip_path))?;
    if !metadata.is_file() {
        return Err(AnalysisError::InvalidArchive(format!(
            "{} is not a file",
            zip_path.display()
        )));
    }

    let archive_bytes = metadata.len();
    if archive_bytes > limits.max_archive_bytes {
        return Err(AnalysisError::LimitExceeded(format!(
            "File size exceeds maximum limit of {}. Your file: {}",
            format_megabytes(limits.max_archive_bytes),
            format_megabytes(archive_bytes)
        )));
    }

    let file = File::open(zip_path).map_err(|e| map_io_error(e, zip_path))?;
    let mut archive = ZipArchive::new(file).map_err(|e| map_zip_error(e, zip_path))?;

    let mut file_count = 0usize;
    let mut uncompressed_bytes = 0u64;
    for i in 0..archive.len() {
        let entry = archive
            .by_index_raw(i)
            .map_err(|e| map_zip_error(e, zip_path))?;
        if entry.is_dir() {
            continue;
        }
        file_count += 1;
        uncompressed_bytes = uncompressed_bytes.saturating_add(entry.size());
    }

    if file_count > limits.max_archive_files {
        return Err(AnalysisError::LimitExceeded(format!(
            "ZIP contains too many files ({}). Maximum allowed: {}",
            file_count, limits.max_archive_files
        )));
    }

    if uncompressed_bytes > limits.max_uncompressed_bytes {
        return Err(AnalysisError::LimitExceeded(format!(
            "ZIP expands to {}, more than the allowed {}",
            format_megabytes(uncompressed_bytes),
            format_megabytes(limits.max_uncompressed_bytes)
        )));
    }

    Ok(ArchiveReport {
        file_count,
        archive_bytes,
        uncompressed_bytes,
    })
}

/// Validate an archive on the blocking pool under the validation timeout
pub async fn validate_archive(
    zip_path: &Path,
    limits: &Limits,
) -> Result<ArchiveReport, AnalysisError> {
    let path: PathBuf = zip_path.to_path_buf();
    let owned_limits = limits.clone();
    let task = tokio::task::spawn_blocking(move || inspect_archive(&path, &owned_limits));

    match tokio::time::timeout(limits.archive_validation_timeout(), task).await {
        Ok(joined) => joined.map_err(|e| AnalysisError::Internal(e.into()))?,
        Err(_) => Err(AnalysisError::InvalidArchive(
            "ZIP validation timed out. The file may be too large or corrupted.".to_string(),
        )),
    }
}

/// Map a zip-crate error onto the analysis taxonomy
pub(crate) fn map_zip_error(err: ZipError, zip_path: &Path) -> AnalysisError {
    match err {
        ZipError::Io(io) => map_io_error(io, zip_path),
        ZipError::InvalidArchive(msg) => AnalysisError::InvalidArchive(format!(
            "{msg}. Please ensure you are uploading a standard .zip file, not RAR or 7z."
        )),
        ZipError::UnsupportedArchive(msg) => {
            AnalysisError::InvalidArchive(format!("unsupported archive: {msg}"))
        }
        other => AnalysisError::InvalidArchive(other.to_string()),
    }
}

/// Map an I/O error raised while reading or extracting an archive
pub(crate) fn map_io_error(err: std::io::Error, zip_path: &Path) -> AnalysisError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::NotFound => AnalysisError::NotFound(zip_path.to_path_buf()),
        ErrorKind::StorageFull => AnalysisError::ResourceExhausted(
            "Not enough disk space to extract ZIP file.".to_string(),
        ),
        ErrorKind::OutOfMemory => AnalysisError::ResourceExhausted(
            "Not enough memory to extract ZIP file. The file may be too large.".to_string(),
        ),
        _ => AnalysisError::Internal(
            anyhow::Error::new(err)
                .context(format!("Failed to read ZIP file {}", zip_path.display())),
        ),
    }
}

fn format_megabytes(bytes: u64) -> String {
    format!("{:.2}MB", bytes as f64 / (1024.0 * 1024.0))
}
