//! Error taxonomy for the analysis pipeline
//!
//! Whole-run failures are surfaced as [`AnalysisError`]. Each variant maps to
//! an HTTP-style status and a sanitized [`ErrorPayload`] so callers never see
//! raw diagnostics as the primary message. Failures scoped to one file (parse
//! errors, unresolved imports) never reach this type.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Classified failure of a remote clone after retries were exhausted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CloneFailure {
    #[error("Network error: Unable to resolve host. Please check your internet connection and try again.")]
    NetworkError,
    #[error("Clone operation timed out. The repository may be too large. Please try uploading as a ZIP file instead.")]
    Timeout,
    #[error("Repository not found. Please verify the URL and ensure the repository is public.")]
    NotFound,
    #[error("Authentication failed. Private repositories require a valid access token.")]
    AuthFailed,
    #[error("Network connection failed after multiple attempts. Please check your internet connection and try again.")]
    ConnectionReset,
    #[error("Failed to clone repository: {0}")]
    Unknown(String),
}

impl CloneFailure {
    /// Classify raw git diagnostics into a failure kind
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        if lower.contains("could not resolve host") || lower.contains("unable to resolve host") {
            CloneFailure::NetworkError
        } else if lower.contains("timeout") || lower.contains("timed out") {
            CloneFailure::Timeout
        } else if lower.contains("repository not found") || message.contains("404") {
            CloneFailure::NotFound
        } else if lower.contains("authentication failed") || message.contains("403") {
            CloneFailure::AuthFailed
        } else if lower.contains("connection was reset")
            || lower.contains("recv failure")
            || lower.contains("connection reset")
        {
            CloneFailure::ConnectionReset
        } else {
            CloneFailure::Unknown(message.trim().to_string())
        }
    }

    /// Stable machine-readable tag for this failure
    pub fn kind(&self) -> &'static str {
        match self {
            CloneFailure::NetworkError => "NETWORK_ERROR",
            CloneFailure::Timeout => "TIMEOUT",
            CloneFailure::NotFound => "NOT_FOUND",
            CloneFailure::AuthFailed => "AUTH_FAILED",
            CloneFailure::ConnectionReset => "CONNECTION_FAILED",
            CloneFailure::Unknown(_) => "UNKNOWN",
        }
    }

    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        !matches!(self, CloneFailure::NotFound | CloneFailure::AuthFailed)
    }
}

/// Errors that abort an analysis or materialization run
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("ZIP file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Project directory does not exist for '{0}' and no ZIP file was provided")]
    ProjectNotFound(String),

    #[error("No analysis stored for project '{0}'")]
    AnalysisMissing(String),

    #[error("Invalid ZIP file: {0}")]
    InvalidArchive(String),

    #[error("{0}")]
    LimitExceeded(String),

    #[error("{0}")]
    ResourceExhausted(String),

    #[error("{failure}")]
    CloneFailed {
        failure: CloneFailure,
        /// Redacted diagnostics from the last attempt
        details: String,
    },

    #[error("Analysis timed out after {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("An analysis for project '{0}' is already running")]
    AlreadyRunning(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Per-file parse failure; the file contributes nothing and the run goes on
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("failed to read source file: {0}")]
    Unreadable(#[from] std::io::Error),

    #[error("source file is {0} bytes, above the parse limit")]
    TooLarge(u64),

    #[error("source file has syntax errors")]
    Syntax,

    #[error("parser unavailable: {0}")]
    Parser(String),
}

/// Stable `{error, details?}` shape returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AnalysisError {
    /// HTTP-style status code for this error
    /// Single-line detail for the error log, never shown to callers
    pub fn log_detail(&self) -> String {
        match self {
            AnalysisError::Internal(err) => format!("Internal({:?})", format!("{err:#}")),
            other => format!("{other:?}"),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::InvalidArchive(_) | AnalysisError::InvalidInput(_) => 400,
            AnalysisError::AccessDenied(_) => 403,
            AnalysisError::NotFound(_)
            | AnalysisError::ProjectNotFound(_)
            | AnalysisError::AnalysisMissing(_) => 404,
            AnalysisError::AlreadyRunning(_) => 409,
            AnalysisError::LimitExceeded(_) => 413,
            AnalysisError::CloneFailed { .. } => 502,
            AnalysisError::Timeout(_) => 504,
            AnalysisError::ResourceExhausted(_) => 507,
            AnalysisError::Internal(_) => 500,
        }
    }

    /// True when the caller must change its input rather than retry
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// True when the project must be uploaded again before analysis can run
    pub fn requires_reupload(&self) -> bool {
        matches!(
            self,
            AnalysisError::ProjectNotFound(_) | AnalysisError::NotFound(_)
        )
    }

    /// Sanitized payload for callers
    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            AnalysisError::ProjectNotFound(_) | AnalysisError::NotFound(_) => ErrorPayload {
                error: "Project files not found. Please upload the project again.".to_string(),
                details: Some(self.to_string()),
            },
            AnalysisError::CloneFailed { failure, details } => ErrorPayload {
                error: failure.to_string(),
                details: Some(format!("{}: {}", failure.kind(), details)),
            },
            AnalysisError::Internal(err) => ErrorPayload {
                error: "Analysis failed".to_string(),
                details: Some(err.to_string()),
            },
            other => ErrorPayload {
                error: other.to_string(),
                details: None,
            },
        }
    }
}
