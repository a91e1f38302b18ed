//! Input and settings validation utilities
//!
//! Centralized validation for caller-supplied identifiers and URLs and for the
//! settings file. Validation errors carry enough context to be shown to a
//! user as-is.

use crate::config::Settings;
use crate::constants;
use anyhow::anyhow;

/// Enumeration of possible validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Project id is empty
    EmptyProjectId,
    /// Project id is longer than allowed
    ProjectIdTooLong(String),
    /// Project id contains characters unsafe for file names
    InvalidProjectId(String),
    /// Repository URL is empty
    EmptyRepositoryUrl,
    /// Repository URL uses an unsupported scheme or form
    InvalidRepositoryUrl(String),
    /// A numeric setting must be greater than zero
    ZeroSetting(&'static str),
    /// A directory setting is empty
    EmptyPath(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyProjectId => write!(f, "Project ID is required"),
            ValidationError::ProjectIdTooLong(id) => write!(
                f,
                "Project ID is longer than {} characters: '{}'",
                constants::limits::MAX_PROJECT_ID_LEN,
                id
            ),
            ValidationError::InvalidProjectId(id) => write!(
                f,
                "Project ID may only contain letters, digits, '-' and '_': '{}'",
                id
            ),
            ValidationError::EmptyRepositoryUrl => write!(f, "Git URL is required"),
            ValidationError::InvalidRepositoryUrl(url) => {
                write!(f, "Unsupported git URL: '{}'", url)
            }
            ValidationError::ZeroSetting(name) => {
                write!(f, "Setting '{}' must be greater than zero", name)
            }
            ValidationError::EmptyPath(name) => write!(f, "Setting '{}' cannot be empty", name),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validates a caller-supplied project id
///
/// Project ids become directory and file names, so only ASCII alphanumerics,
/// hyphens and underscores are accepted.
pub fn validate_project_id(project_id: &str) -> Result<(), ValidationError> {
    if project_id.is_empty() {
        return Err(ValidationError::EmptyProjectId);
    }
    if project_id.len() > constants::limits::MAX_PROJECT_ID_LEN {
        return Err(ValidationError::ProjectIdTooLong(project_id.to_string()));
    }
    if !project_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidProjectId(project_id.to_string()));
    }
    Ok(())
}

/// Validates a remote repository URL before it is handed to git
pub fn validate_git_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::EmptyRepositoryUrl);
    }
    if !is_valid_repository_url(url) {
        return Err(ValidationError::InvalidRepositoryUrl(url.to_string()));
    }
    Ok(())
}

/// Helper function to check if a repository URL is valid
///
/// Accepts SSH, HTTPS and HTTP forms. Local paths, `file://` and anything that
/// git could read as an option are rejected.
fn is_valid_repository_url(url: &str) -> bool {
    let allowed = url.starts_with("git@")
        || url.starts_with("https://")
        || url.starts_with("http://")
        || url.starts_with("ssh://");
    allowed && !url.starts_with('-') && !url.chars().any(char::is_whitespace)
}

/// Validates a settings value
pub fn validate_settings(settings: &Settings) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, path) in [
        ("projects_dir", &settings.projects_dir),
        ("uploads_dir", &settings.uploads_dir),
        ("error_log", &settings.error_log),
    ] {
        if path.as_os_str().is_empty() {
            errors.push(ValidationError::EmptyPath(name));
        }
    }

    let limits = &settings.limits;
    let numeric = [
        ("limits.max_archive_bytes", limits.max_archive_bytes),
        ("limits.max_archive_files", limits.max_archive_files as u64),
        ("limits.max_uncompressed_bytes", limits.max_uncompressed_bytes),
        (
            "limits.archive_validation_timeout_secs",
            limits.archive_validation_timeout_secs,
        ),
        ("limits.max_dir_entries", limits.max_dir_entries as u64),
        ("limits.max_source_files", limits.max_source_files as u64),
        ("limits.max_parse_bytes", limits.max_parse_bytes),
        ("limits.analysis_timeout_secs", limits.analysis_timeout_secs),
        ("limits.max_context_files", limits.max_context_files as u64),
        ("clone.attempt_timeout_secs", settings.clone.attempt_timeout_secs),
        ("clone.max_attempts", settings.clone.max_attempts as u64),
        ("retention.max_age_hours", settings.retention.max_age_hours),
    ];
    for (name, value) in numeric {
        if value == 0 {
            errors.push(ValidationError::ZeroSetting(name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Converts validation errors to a user-friendly anyhow error
pub fn validation_errors_to_anyhow(errors: Vec<ValidationError>) -> anyhow::Error {
    let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    anyhow!("Validation errors: {}", error_messages.join("; "))
}
