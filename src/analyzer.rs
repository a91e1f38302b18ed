//! Analysis orchestration
//!
//! [`ProjectAnalyzer`] takes a project id and a source (an archive, an
//! already materialized directory, or a git URL) and produces the
//! [`AnalysisResult`] document:
//!
//! ```text
//! Initializing -> Materializing -> BuildingTree
//!     -> ExtractingGraph + ExtractingComponents (concurrently)
//!     -> Assembling -> Persisted
//! ```
//!
//! Any stage may end in `Failed`. Materializing through Assembling share one
//! time budget; git cloning runs before that budget starts and is bounded by
//! its own per-attempt timeout and retry policy. Work handed to the blocking
//! pool carries the run's lease, so a run that times out keeps its project id
//! leased until that work has stopped.

use crate::analysis::{
    AnalysisResult, build_file_tree, effective_root, extract_components, extract_dependencies,
};
use crate::archive::{extract_archive, validate_archive};
use crate::cleanup::{Lease, LeaseRegistry};
use crate::config::Settings;
use crate::error::AnalysisError;
use crate::git::{GitTransport, RepositoryCloner, SystemGit};
use crate::logger::Logger;
use crate::store::ResultStore;
use crate::utils::validate_project_id;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Pipeline position of a run, logged on every transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Initializing,
    Materializing,
    BuildingTree,
    ExtractingGraph,
    ExtractingComponents,
    Assembling,
    Persisted,
    Failed(String),
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Initializing => write!(f, "initializing"),
            Stage::Materializing => write!(f, "materializing"),
            Stage::BuildingTree => write!(f, "building file tree"),
            Stage::ExtractingGraph => write!(f, "extracting dependency graph"),
            Stage::ExtractingComponents => write!(f, "extracting components"),
            Stage::Assembling => write!(f, "assembling result"),
            Stage::Persisted => write!(f, "persisted"),
            Stage::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Runs analyses and owns the in-flight lease registry
pub struct ProjectAnalyzer<T: GitTransport = SystemGit> {
    settings: Settings,
    store: ResultStore,
    leases: LeaseRegistry,
    cloner: RepositoryCloner<T>,
    logger: Logger,
}

impl ProjectAnalyzer<SystemGit> {
    pub fn new(settings: Settings) -> Self {
        let cloner = RepositoryCloner::from_settings(&settings.clone);
        Self::with_cloner(settings, cloner)
    }
}

impl<T: GitTransport> ProjectAnalyzer<T> {
    pub fn with_cloner(settings: Settings, cloner: RepositoryCloner<T>) -> Self {
        Self {
            store: ResultStore::new(settings.clone()),
            leases: LeaseRegistry::new(&settings.projects_dir),
            settings,
            cloner,
            logger: Logger,
        }
    }

    /// Share a lease registry, typically with a retention sweeper
    pub fn with_leases(mut self, leases: LeaseRegistry) -> Self {
        self.leases = leases;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn leases(&self) -> &LeaseRegistry {
        &self.leases
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Analyze a project from `zip`, or from its existing directory when no
    /// archive is given, and persist the result
    pub async fn analyze(
        &self,
        project_id: &str,
        zip: Option<&Path>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let lease = self.begin(project_id)?;
        let outcome = self.analyze_leased(&lease, zip).await;
        self.finish("Analysis", project_id, outcome)
    }

    /// Clone `url` into the project directory without analyzing it
    pub async fn materialize_repository(
        &self,
        project_id: &str,
        url: &str,
        token: Option<&str>,
    ) -> Result<PathBuf, AnalysisError> {
        let _lease = self.begin(project_id)?;
        let outcome = self.clone_leased(project_id, url, token).await;
        self.finish("Clone", project_id, outcome)
    }

    /// Clone `url` and analyze the result as one leased run
    pub async fn analyze_repository(
        &self,
        project_id: &str,
        url: &str,
        token: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let lease = self.begin(project_id)?;
        let outcome = match self.clone_leased(project_id, url, token).await {
            Ok(_) => self.analyze_leased(&lease, None).await,
            Err(e) => Err(e),
        };
        self.finish("Analysis", project_id, outcome)
    }

    fn begin(&self, project_id: &str) -> Result<Arc<Lease>, AnalysisError> {
        validate_project_id(project_id)
            .map_err(|e| AnalysisError::InvalidInput(e.to_string()))?;
        let lease = self
            .leases
            .acquire(project_id)
            .map_err(|e| {
                AnalysisError::Internal(
                    anyhow::Error::new(e).context(format!("Failed to lock project {project_id}")),
                )
            })?
            .ok_or_else(|| AnalysisError::AlreadyRunning(project_id.to_string()))?;
        self.enter(project_id, Stage::Initializing);
        Ok(Arc::new(lease))
    }

    fn finish<R>(
        &self,
        operation: &str,
        project_id: &str,
        outcome: Result<R, AnalysisError>,
    ) -> Result<R, AnalysisError> {
        if let Err(err) = &outcome {
            self.enter(project_id, Stage::Failed(err.to_string()));
            if let Err(log_err) = self.store.record_failure(operation, project_id, err) {
                self.logger
                    .warn(project_id, &format!("Could not write error log: {log_err:#}"));
            }
        }
        outcome
    }

    fn enter(&self, project_id: &str, stage: Stage) {
        match &stage {
            Stage::Failed(_) => self.logger.error(project_id, &format!("Stage: {stage}")),
            Stage::Persisted => self.logger.success(project_id, &format!("Stage: {stage}")),
            _ => self.logger.info(project_id, &format!("Stage: {stage}")),
        }
    }

    async fn clone_leased(
        &self,
        project_id: &str,
        url: &str,
        token: Option<&str>,
    ) -> Result<PathBuf, AnalysisError> {
        self.enter(project_id, Stage::Materializing);
        let target = self.settings.project_dir(project_id);
        let report = self
            .cloner
            .clone_repository(project_id, url, token, &target)
            .await?;
        Ok(report.target)
    }

    async fn analyze_leased(
        &self,
        lease: &Arc<Lease>,
        zip: Option<&Path>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let project_id = lease.project_id();
        let budget = self.settings.limits.analysis_timeout();
        let result = tokio::time::timeout(budget, self.run(lease, zip))
            .await
            .map_err(|_| AnalysisError::Timeout(budget.as_secs()))??;

        let store = self.store.clone();
        let to_save = result.clone();
        let path =
            blocking(lease, move || store.save(&to_save).map_err(AnalysisError::from)).await?;
        self.enter(project_id, Stage::Persisted);
        self.logger
            .success(project_id, &format!("Analysis saved to {}", path.display()));
        Ok(result)
    }

    async fn run(
        &self,
        lease: &Arc<Lease>,
        zip: Option<&Path>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let project_id = lease.project_id();
        let limits = self.settings.limits.clone();
        let project_dir = self.settings.project_dir(project_id);

        self.enter(project_id, Stage::Materializing);
        match zip {
            Some(zip) => {
                let report = validate_archive(zip, &limits).await?;
                self.logger.info(
                    project_id,
                    &format!("Extracting {} files", report.file_count),
                );
                let zip = zip.to_path_buf();
                let target = project_dir.clone();
                let budget = limits.max_uncompressed_bytes;
                blocking(lease, move || extract_archive(&zip, &target, budget)).await?;
            }
            None if !project_dir.is_dir() => {
                return Err(AnalysisError::ProjectNotFound(project_id.to_string()));
            }
            None => {}
        }
        let root = effective_root(&project_dir);
        if root != project_dir {
            self.logger.info(
                project_id,
                &format!("Using nested root {}", root.display()),
            );
        }

        self.enter(project_id, Stage::BuildingTree);
        let structure = {
            let root = root.clone();
            let limits = limits.clone();
            blocking(lease, move || {
                build_file_tree(&root, &limits).map_err(AnalysisError::from)
            })
            .await?
        };

        self.enter(project_id, Stage::ExtractingGraph);
        self.enter(project_id, Stage::ExtractingComponents);
        let graph_task = {
            let root = root.clone();
            let limits = limits.clone();
            spawn_leased(lease, move || extract_dependencies(&root, &limits))
        };
        let component_task = {
            let root = root.clone();
            let limits = limits.clone();
            spawn_leased(lease, move || extract_components(&root, &limits))
        };
        let (graph, components) = tokio::try_join!(graph_task, component_task)
            .map_err(|e| AnalysisError::Internal(e.into()))?;

        if let Some(reason) = &graph.degraded {
            self.logger.warn(
                project_id,
                &format!("Graph extraction degraded to {}: {}", graph.strategy, reason),
            );
        }
        if components.truncated {
            self.logger.warn(
                project_id,
                &format!(
                    "Source file limit of {} reached; remaining files were not analyzed",
                    limits.max_source_files
                ),
            );
        }
        if components.skipped_files > 0 {
            self.logger.warn(
                project_id,
                &format!(
                    "Skipped {} source files that could not be parsed",
                    components.skipped_files
                ),
            );
        }

        self.enter(project_id, Stage::Assembling);
        Ok(AnalysisResult {
            project_id: project_id.to_string(),
            timestamp: chrono::Utc::now(),
            structure,
            dependencies: graph.graph,
            components: components.components,
        })
    }
}

/// Run `work` on the blocking pool with a clone of `lease` moved into the task
///
/// Dropping the returned handle does not stop the task, and the lease is held
/// until `work` returns.
fn spawn_leased<R, F>(lease: &Arc<Lease>, work: F) -> JoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let lease = Arc::clone(lease);
    tokio::task::spawn_blocking(move || {
        let result = work();
        drop(lease);
        result
    })
}

async fn blocking<R, F>(lease: &Arc<Lease>, work: F) -> Result<R, AnalysisError>
where
    F: FnOnce() -> Result<R, AnalysisError> + Send + 'static,
    R: Send + 'static,
{
    spawn_leased(lease, work)
        .await
        .map_err(|e| AnalysisError::Internal(e.into()))?
}
