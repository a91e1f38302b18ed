//! Command argument validation utilities
//!
//! This module provides centralized validation logic for command arguments
//! after clap parsing. Failures surface as `InvalidInput` so the CLI reports
//! them as client errors.

use crate::error::AnalysisError;
use crate::utils::{validate_git_url, validate_project_id};
use anyhow::Result;
use std::path::Path;

/// Validation errors for command arguments
#[derive(Debug, PartialEq)]
pub enum CommandValidationError {
    /// Required argument was not provided
    MissingRequired {
        argument: String,
        alternatives: Vec<String>,
    },
    /// Invalid argument value
    InvalidValue {
        argument: String,
        value: String,
        reason: String,
    },
}

impl std::fmt::Display for CommandValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandValidationError::MissingRequired {
                argument,
                alternatives,
            } => {
                if alternatives.is_empty() {
                    write!(f, "{} is required", argument)
                } else {
                    write!(
                        f,
                        "Either {} or {} must be provided",
                        alternatives.join(", "),
                        argument
                    )
                }
            }
            CommandValidationError::InvalidValue {
                argument,
                value,
                reason,
            } => {
                write!(f, "Invalid value '{}' for {}: {}", value, argument, reason)
            }
        }
    }
}

impl std::error::Error for CommandValidationError {}

/// Convert validation error to anyhow::Error carrying `InvalidInput`
pub fn validation_error_to_anyhow(error: CommandValidationError) -> anyhow::Error {
    AnalysisError::InvalidInput(error.to_string()).into()
}

/// Validate a project id argument
pub fn validate_project_id_arg(project_id: &str) -> Result<()> {
    validate_project_id(project_id).map_err(|e| {
        validation_error_to_anyhow(CommandValidationError::InvalidValue {
            argument: "--project-id".to_string(),
            value: project_id.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Validate a repository URL argument
pub fn validate_repository_url(url: &str) -> Result<()> {
    validate_git_url(url).map_err(|e| {
        validation_error_to_anyhow(CommandValidationError::InvalidValue {
            argument: "repository URL".to_string(),
            value: url.to_string(),
            reason: e.to_string(),
        })
    })
}

/// Validate that an archive argument names an existing `.zip` file
pub fn validate_zip_path(path: &Path) -> Result<()> {
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: "zip".to_string(),
                value: path.display().to_string(),
                reason: "only .zip archives are accepted".to_string(),
            },
        ));
    }
    if !path.is_file() {
        return Err(AnalysisError::NotFound(path.to_path_buf()).into());
    }
    Ok(())
}

/// Validate a feature request for the context command
///
/// Ensures the request has at least one non-whitespace word
pub fn validate_feature_request(words: &[String]) -> Result<()> {
    if words.iter().all(|w| w.trim().is_empty()) {
        return Err(validation_error_to_anyhow(
            CommandValidationError::MissingRequired {
                argument: "feature request".to_string(),
                alternatives: vec![],
            },
        ));
    }
    Ok(())
}

/// Validate the retention age for the cleanup command
pub fn validate_max_age_hours(hours: Option<u64>) -> Result<()> {
    if hours == Some(0) {
        return Err(validation_error_to_anyhow(
            CommandValidationError::InvalidValue {
                argument: "--max-age-hours".to_string(),
                value: "0".to_string(),
                reason: "age must be at least one hour".to_string(),
            },
        ));
    }
    Ok(())
}
