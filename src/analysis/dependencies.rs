//! Dependency graph extraction
//!
//! Two strategies sit behind [`GraphStrategy`]:
//!
//! - [`ModuleGraphStrategy`] seeds from a conventional entry point and
//!   follows AST-level imports to every reachable source file.
//! - [`ManualScanStrategy`] visits every source file and pattern-matches
//!   `import ... from` statements.
//!
//! [`extract_with`] uses the first unless it yields nothing or fails.

use super::imports::{ast_imports, is_relative, regex_imports, resolve_import};
use super::syntax::parse_source;
use super::types::DependencyGraph;
use super::walk::{read_source, source_files};
use crate::config::Limits;
use crate::constants;
use crate::utils::{has_source_extension, relative_slash_path};
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// What a single strategy produced
#[derive(Debug)]
pub enum GraphOutcome {
    Graph(DependencyGraph),
    /// Ran to completion but found no edges
    Empty,
    Error(anyhow::Error),
}

pub trait GraphStrategy {
    fn name(&self) -> &'static str;
    fn extract(&self, root: &Path) -> GraphOutcome;
}

/// The graph that was kept and how it was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphExtraction {
    pub graph: DependencyGraph,
    pub strategy: &'static str,
    /// Why the primary strategy was abandoned, if it was
    pub degraded: Option<String>,
}

/// Static module-graph resolution from the first existing entry point
#[derive(Debug, Clone)]
pub struct ModuleGraphStrategy {
    pub max_files: usize,
    /// Files above this size are kept as graph nodes but not parsed
    pub max_bytes: u64,
}

/// Recursive scan with line-oriented import matching
#[derive(Debug, Clone)]
pub struct ManualScanStrategy {
    pub max_files: usize,
    pub max_bytes: u64,
}

/// First conventional entry point that exists under `root`
pub fn find_entry_point(root: &Path) -> Option<PathBuf> {
    constants::source::ENTRY_POINTS
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.is_file())
}

impl GraphStrategy for ModuleGraphStrategy {
    fn name(&self) -> &'static str {
        "module-graph"
    }

    fn extract(&self, root: &Path) -> GraphOutcome {
        let Some(entry) = find_entry_point(root) else {
            return GraphOutcome::Error(anyhow::anyhow!("no entry point found"));
        };

        let mut graph = DependencyGraph::new();
        let mut seen: HashSet<PathBuf> = HashSet::from([entry.clone()]);
        let mut queue = VecDeque::from([entry]);
        let mut edges = 0usize;

        while let Some(file) = queue.pop_front() {
            let Some(key) = relative_slash_path(root, &file) else {
                continue;
            };
            let targets = match read_source(&file, self.max_bytes) {
                Ok(source) => module_imports(root, &file, &source),
                Err(_) => Vec::new(),
            };

            for target in &targets {
                if seen.len() < self.max_files && seen.insert(target.clone()) {
                    queue.push_back(target.clone());
                }
            }

            let targets: Vec<String> = targets
                .iter()
                .filter_map(|t| relative_slash_path(root, t))
                .collect();
            edges += targets.len();
            graph.insert(key, targets);
        }

        if edges == 0 {
            GraphOutcome::Empty
        } else {
            GraphOutcome::Graph(graph)
        }
    }
}

/// Resolved, deduplicated source-file imports of one module
fn module_imports(root: &Path, file: &Path, source: &str) -> Vec<PathBuf> {
    let Ok(tree) = parse_source(file, source) else {
        return Vec::new();
    };
    let mut targets = Vec::new();
    for specifier in ast_imports(&tree, source) {
        let Some(target) = resolve_import(root, file, &specifier) else {
            continue;
        };
        if has_source_extension(&target) && !targets.contains(&target) {
            targets.push(target);
        }
    }
    targets
}

impl GraphStrategy for ManualScanStrategy {
    fn name(&self) -> &'static str {
        "manual-scan"
    }

    fn extract(&self, root: &Path) -> GraphOutcome {
        if !root.is_dir() {
            return GraphOutcome::Error(anyhow::anyhow!(
                "{} is not a directory",
                root.display()
            ));
        }

        let mut graph = DependencyGraph::new();
        for file in source_files(root, self.max_files).files {
            let Ok(source) = read_source(&file, self.max_bytes) else {
                continue;
            };
            let mut targets: Vec<String> = Vec::new();
            for specifier in regex_imports(&source) {
                if !is_relative(&specifier) {
                    continue;
                }
                let resolved = resolve_import(root, &file, &specifier)
                    .and_then(|t| relative_slash_path(root, &t));
                if let Some(target) = resolved.filter(|t| !targets.contains(t)) {
                    targets.push(target);
                }
            }
            if targets.is_empty() {
                continue;
            }
            if let Some(key) = relative_slash_path(root, &file) {
                graph.insert(key, targets);
            }
        }

        if graph.is_empty() {
            GraphOutcome::Empty
        } else {
            GraphOutcome::Graph(graph)
        }
    }
}

/// Run `primary`, falling back to `fallback` when it is empty or fails
///
/// A failing fallback yields an empty graph; graph extraction never aborts a
/// run.
pub fn extract_with(
    primary: &dyn GraphStrategy,
    fallback: &dyn GraphStrategy,
    root: &Path,
) -> GraphExtraction {
    let reason = match primary.extract(root) {
        GraphOutcome::Graph(graph) => {
            return GraphExtraction {
                graph,
                strategy: primary.name(),
                degraded: None,
            };
        }
        GraphOutcome::Empty => format!("{} produced an empty graph", primary.name()),
        GraphOutcome::Error(err) => format!("{} failed: {err:#}", primary.name()),
    };

    let graph = match fallback.extract(root) {
        GraphOutcome::Graph(graph) => graph,
        GraphOutcome::Empty => DependencyGraph::new(),
        GraphOutcome::Error(err) => {
            return GraphExtraction {
                graph: DependencyGraph::new(),
                strategy: fallback.name(),
                degraded: Some(format!("{reason}; {} failed: {err:#}", fallback.name())),
            };
        }
    };

    GraphExtraction {
        graph,
        strategy: fallback.name(),
        degraded: Some(reason),
    }
}

/// Extract the dependency graph of `root` with the default strategies
pub fn extract_dependencies(root: &Path, limits: &Limits) -> GraphExtraction {
    let (max_files, max_bytes) = (limits.max_source_files, limits.max_parse_bytes);
    extract_with(
        &ModuleGraphStrategy {
            max_files,
            max_bytes,
        },
        &ManualScanStrategy {
            max_files,
            max_bytes,
        },
        root,
    )
}
