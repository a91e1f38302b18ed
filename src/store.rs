//! Persistence of analysis results and the durable error log

use crate::analysis::AnalysisResult;
use crate::config::Settings;
use crate::error::AnalysisError;
use crate::utils::{ensure_directory_exists, write_atomic};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and writes `<projects_dir>/<projectId>_analysis.json`
#[derive(Debug, Clone)]
pub struct ResultStore {
    settings: Settings,
}

impl ResultStore {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn path_for(&self, project_id: &str) -> PathBuf {
        self.settings.analysis_path(project_id)
    }

    /// Persist `result` atomically, replacing any earlier analysis
    pub fn save(&self, result: &AnalysisResult) -> Result<PathBuf> {
        let path = self.path_for(&result.project_id);
        let json = serde_json::to_vec_pretty(result).context("Failed to serialize analysis")?;
        write_atomic(&path, &json)?;
        Ok(path)
    }

    /// Load the persisted analysis of `project_id`
    pub fn load(&self, project_id: &str) -> Result<AnalysisResult, AnalysisError> {
        let path = self.path_for(project_id);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AnalysisError::AnalysisMissing(project_id.to_string()));
            }
            Err(e) => {
                return Err(AnalysisError::Internal(
                    anyhow::Error::new(e).context(format!("Failed to read {}", path.display())),
                ));
            }
        };
        let result = serde_json::from_slice(&raw)
            .with_context(|| format!("Corrupt analysis file {}", path.display()))?;
        Ok(result)
    }

    /// Append one aborted operation to the error log
    ///
    /// The log keeps [`AnalysisError::log_detail`]; callers only ever see
    /// the sanitized payload.
    pub fn record_failure(
        &self,
        operation: &str,
        project_id: &str,
        err: &AnalysisError,
    ) -> Result<()> {
        append_error_log(
            &self.settings.error_log,
            operation,
            project_id,
            &err.log_detail(),
        )
    }
}

/// Append `[timestamp] <operation> error for <projectId>: <detail>` to `log`
///
/// Each entry is exactly one line; line breaks in `detail` are escaped.
pub fn append_error_log(
    log: &Path,
    operation: &str,
    project_id: &str,
    detail: &str,
) -> Result<()> {
    if let Some(parent) = log.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_directory_exists(parent)?;
    }
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log)
        .with_context(|| format!("Failed to open error log {}", log.display()))?;
    writeln!(
        file,
        "[{}] {} error for {}: {}",
        chrono::Utc::now().to_rfc3339(),
        operation,
        project_id,
        detail.replace('\r', "\\r").replace('\n', "\\n")
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn store(temp: &TempDir) -> ResultStore {
        ResultStore::new(Settings::default().with_base_dir(temp.path()))
    }

    fn sample(project_id: &str) -> AnalysisResult {
        AnalysisResult {
            project_id: project_id.to_string(),
            timestamp: Utc::now(),
            structure: Vec::new(),
            dependencies: [("a.js".to_string(), vec!["b.js".to_string()])]
                .into_iter()
                .collect(),
            components: Vec::new(),
        }
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let path = store.save(&sample("p1")).unwrap();
        assert!(path.ends_with("p1_analysis.json"));

        let loaded = store.load("p1").unwrap();
        assert_eq!(loaded, sample_with_timestamp(&loaded));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["projectId"], "p1");
        assert_eq!(json["dependencies"]["a.js"][0], "b.js");
    }

    fn sample_with_timestamp(loaded: &AnalysisResult) -> AnalysisResult {
        AnalysisResult {
            timestamp: loaded.timestamp,
            ..sample(&loaded.project_id)
        }
    }

    #[test]
    fn test_load_missing() {
        let temp = TempDir::new().unwrap();
        let err = store(&temp).load("nope").unwrap_err();
        assert!(matches!(err, AnalysisError::AnalysisMissing(_)));
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_error_log_appends() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store
            .record_failure("Analysis", "p1", &AnalysisError::Timeout(60))
            .unwrap();
        let internal = anyhow::anyhow!("disk full\nretry later").context("Failed to save");
        store
            .record_failure("Clone", "p2", &AnalysisError::Internal(internal))
            .unwrap();

        let log = std::fs::read_to_string(temp.path().join("DEBUG_ERROR.txt")).unwrap();
        let lines: Vec<_> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Analysis error for p1: Timeout(60)"));
        assert!(lines[1].contains("Clone error for p2: Internal("));
        assert!(lines[1].contains("Failed to save: disk full"));
        assert!(lines[1].contains("retry later"));
    }

    #[test]
    fn test_error_log_escapes_line_breaks() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("logs/errors.txt");

        append_error_log(&log, "Analysis", "p1", "first\nsecond\r\nthird").unwrap();

        let raw = std::fs::read_to_string(&log).unwrap();
        assert_eq!(raw.lines().count(), 1);
        assert!(raw.contains(r"first\nsecond\r\nthird"));
    }
}
