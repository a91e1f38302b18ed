//! Shallow repository cloning with retry and failure classification
//!
//! The git binary sits behind [`GitTransport`] so the retry loop in
//! [`RepositoryCloner`] can be driven without a network.

use super::retry::RetryPolicy;
use crate::config::CloneSettings;
use crate::constants;
use crate::error::{AnalysisError, CloneFailure};
use crate::logger::Logger;
use crate::utils::{empty_directory, redact_secret, redact_url_credentials, validate_git_url};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

/// Performs a single shallow clone attempt
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Clone `url` into the existing, empty directory `target`
    ///
    /// Errors carry the raw git diagnostics; the caller classifies and redacts
    /// them.
    async fn clone_shallow(&self, url: &str, target: &Path, timeout: Duration) -> Result<()>;
}

/// [`GitTransport`] backed by the system `git` binary
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

#[async_trait]
impl GitTransport for SystemGit {
    async fn clone_shallow(&self, url: &str, target: &Path, timeout: Duration) -> Result<()> {
        let mut command = tokio::process::Command::new("git");
        command
            .arg("clone")
            .args(constants::git::CLONE_OPTIONS)
            .arg("--")
            .arg(url)
            .arg(target)
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, command.output()).await {
            Ok(output) => output.context("Failed to execute git clone command")?,
            Err(_) => anyhow::bail!(
                "clone attempt timed out after {} seconds",
                timeout.as_secs()
            ),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{}", stderr.trim());
        }

        Ok(())
    }
}

/// Result of a successful clone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneReport {
    pub target: PathBuf,
    pub attempts: u32,
}

/// Clones repositories with bounded retry
pub struct RepositoryCloner<T: GitTransport = SystemGit> {
    transport: T,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    logger: Logger,
}

impl RepositoryCloner<SystemGit> {
    pub fn from_settings(settings: &CloneSettings) -> Self {
        Self::new(
            SystemGit,
            RetryPolicy::from_settings(settings),
            Duration::from_secs(settings.attempt_timeout_secs),
        )
    }
}

impl<T: GitTransport> RepositoryCloner<T> {
    pub fn new(transport: T, policy: RetryPolicy, attempt_timeout: Duration) -> Self {
        Self {
            transport,
            policy,
            attempt_timeout,
            logger: Logger,
        }
    }

    /// Shallow-clone `url` into `target`
    ///
    /// `target` is emptied before every attempt. Failures that cannot be fixed
    /// by retrying (missing repository, rejected credentials) stop the loop
    /// early.
    pub async fn clone_repository(
        &self,
        project_id: &str,
        url: &str,
        token: Option<&str>,
        target: &Path,
    ) -> Result<CloneReport, AnalysisError> {
        validate_git_url(url).map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;

        let remote = authenticated_url(url, token);
        self.logger.info(
            project_id,
            &format!("Cloning {} (shallow)", redact_url_credentials(url)),
        );

        let mut attempt = 1;
        loop {
            reset_target(target).await?;

            let err = match self
                .transport
                .clone_shallow(&remote, target, self.attempt_timeout)
                .await
            {
                Ok(()) => {
                    self.logger.success(
                        project_id,
                        &format!("Cloned on attempt {}/{}", attempt, self.policy.max_attempts),
                    );
                    return Ok(CloneReport {
                        target: target.to_path_buf(),
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            let details = redact_secret(&format!("{err:#}"), token);
            let failure = CloneFailure::classify(&details);
            self.logger.warn(
                project_id,
                &format!(
                    "Clone attempt {}/{} failed ({}): {}",
                    attempt,
                    self.policy.max_attempts,
                    failure.kind(),
                    details
                ),
            );

            if !self.policy.should_retry(attempt, &failure) {
                self.logger.error(project_id, &failure.to_string());
                if let Err(e) = reset_target(target).await {
                    self.logger
                        .warn(project_id, &format!("Could not clear clone target: {e}"));
                }
                return Err(AnalysisError::CloneFailed { failure, details });
            }

            let delay = self.policy.delay_for(attempt);
            self.logger.info(
                project_id,
                &format!("Retrying in {}s", delay.as_secs_f32()),
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Embed token authentication for known https git hosts
///
/// URLs for other hosts, non-https URLs and URLs that already carry user info
/// are returned unchanged.
pub fn authenticated_url(url: &str, token: Option<&str>) -> String {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return url.to_string();
    };
    let Some(rest) = url.strip_prefix("https://") else {
        return url.to_string();
    };

    let authority = rest.split('/').next().unwrap_or_default();
    if authority.contains('@') {
        return url.to_string();
    }

    match authority.to_ascii_lowercase().as_str() {
        "github.com" => format!("https://x-access-token:{token}@{rest}"),
        "gitlab.com" => format!("https://oauth2:{token}@{rest}"),
        _ => url.to_string(),
    }
}

async fn reset_target(target: &Path) -> Result<(), AnalysisError> {
    let target = target.to_path_buf();
    tokio::task::spawn_blocking(move || {
        empty_directory(&target)
            .with_context(|| format!("Failed to prepare clone target {}", target.display()))
    })
    .await
    .map_err(|e| AnalysisError::Internal(e.into()))??;
    Ok(())
}
