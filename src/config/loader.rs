//! Settings file loading and saving

use crate::constants;
use crate::utils::validators;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resource limits applied to uploaded and analyzed content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_archive_bytes: u64,
    pub max_archive_files: usize,
    pub max_uncompressed_bytes: u64,
    pub archive_validation_timeout_secs: u64,
    pub max_tree_depth: usize,
    pub max_dir_entries: usize,
    pub max_source_files: usize,
    pub max_parse_bytes: u64,
    pub analysis_timeout_secs: u64,
    pub max_context_files: usize,
    pub context_snippet_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        use constants::limits::*;
        Self {
            max_archive_bytes: MAX_ARCHIVE_BYTES,
            max_archive_files: MAX_ARCHIVE_FILES,
            max_uncompressed_bytes: MAX_UNCOMPRESSED_BYTES,
            archive_validation_timeout_secs: ARCHIVE_VALIDATION_TIMEOUT_SECS,
            max_tree_depth: MAX_TREE_DEPTH,
            max_dir_entries: MAX_DIR_ENTRIES,
            max_source_files: MAX_SOURCE_FILES,
            max_parse_bytes: MAX_PARSE_BYTES,
            analysis_timeout_secs: ANALYSIS_TIMEOUT_SECS,
            max_context_files: MAX_CONTEXT_FILES,
            context_snippet_chars: CONTEXT_SNIPPET_CHARS,
        }
    }
}

impl Limits {
    pub fn analysis_timeout(&self) -> Duration {
        Duration::from_secs(self.analysis_timeout_secs)
    }

    pub fn archive_validation_timeout(&self) -> Duration {
        Duration::from_secs(self.archive_validation_timeout_secs)
    }
}

/// Remote clone behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneSettings {
    pub attempt_timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_base_secs: u64,
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            attempt_timeout_secs: constants::git::CLONE_ATTEMPT_TIMEOUT_SECS,
            max_attempts: constants::git::CLONE_MAX_ATTEMPTS,
            backoff_base_secs: constants::git::CLONE_BACKOFF_BASE_SECS,
        }
    }
}

/// Retention sweep threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    pub max_age_hours: u64,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            max_age_hours: constants::retention::MAX_AGE_HOURS,
        }
    }
}

impl RetentionSettings {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours.saturating_mul(60 * 60))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub projects_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub error_log: PathBuf,
    pub limits: Limits,
    pub clone: CloneSettings,
    pub retention: RetentionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            projects_dir: PathBuf::from(constants::config::DEFAULT_PROJECTS_DIR),
            uploads_dir: PathBuf::from(constants::config::DEFAULT_UPLOADS_DIR),
            error_log: PathBuf::from(constants::config::DEFAULT_ERROR_LOG),
            limits: Limits::default(),
            clone: CloneSettings::default(),
            retention: RetentionSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file when it exists, defaults otherwise
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save settings to a YAML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, format!("---\n{yaml}"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        validators::validate_settings(self).map_err(validators::validation_errors_to_anyhow)
    }

    /// Directory a project is materialized into
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.projects_dir.join(project_id)
    }

    /// Location of the persisted analysis for a project
    pub fn analysis_path(&self, project_id: &str) -> PathBuf {
        self.projects_dir.join(format!(
            "{project_id}{}",
            constants::config::ANALYSIS_FILE_SUFFIX
        ))
    }

    /// Conventional location of an uploaded archive
    pub fn upload_path(&self, project_id: &str) -> PathBuf {
        self.uploads_dir.join(format!("{project_id}.zip"))
    }

    /// Override directory settings from `CODESIGHT_*` environment variables
    ///
    /// Empty values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        use constants::env::*;
        for (var, dir) in [
            (PROJECTS_DIR, &mut self.projects_dir),
            (UPLOADS_DIR, &mut self.uploads_dir),
            (ERROR_LOG, &mut self.error_log),
        ] {
            if let Some(value) = std::env::var_os(var).filter(|v| !v.is_empty()) {
                *dir = PathBuf::from(value);
            }
        }
        self
    }

    /// Rebase relative directories onto `base`
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        for dir in [
            &mut self.projects_dir,
            &mut self.uploads_dir,
            &mut self.error_log,
        ] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
        self
    }
}
