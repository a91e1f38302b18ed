//! Relevant-file selection and the feature-context digest
//!
//! Bounds how much project source is forwarded to a feature-suggestion
//! assistant: a handful of keyword-ranked files, each truncated, plus the
//! dependency graph.

use crate::analysis::{AnalysisResult, DependencyGraph, effective_root};
use crate::error::AnalysisError;
use crate::logger::Logger;
use crate::utils::{join_within, truncate_chars};
use anyhow::Context;
use serde::Serialize;
use std::fmt::Write;
use std::path::{Path, PathBuf};

/// Read a project file by its path relative to the project root
///
/// Paths that climb out of the root (lexically or through a symlink) are
/// refused. A missing file is looked up again under the nested root, since
/// analysis paths are relative to the effective root.
pub fn read_project_file(
    project_root: &Path,
    relative_path: &str,
) -> Result<String, AnalysisError> {
    let path = resolve_project_path(project_root, relative_path)?;
    if path.is_dir() {
        return Err(AnalysisError::InvalidInput(format!(
            "{relative_path} is a directory"
        )));
    }

    let canonical_root = project_root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", project_root.display()))?;
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    if !canonical.starts_with(&canonical_root) {
        return Err(AnalysisError::AccessDenied(relative_path.to_string()));
    }

    let content = std::fs::read_to_string(&canonical)
        .with_context(|| format!("Failed to read {}", canonical.display()))?;
    Ok(content)
}

fn resolve_project_path(
    project_root: &Path,
    relative_path: &str,
) -> Result<PathBuf, AnalysisError> {
    let relative = Path::new(relative_path.trim_start_matches('/'));
    let path = join_within(project_root, relative)
        .ok_or_else(|| AnalysisError::AccessDenied(relative_path.to_string()))?;
    if path.exists() {
        return Ok(path);
    }

    let nested = effective_root(project_root);
    if nested != project_root {
        if let Some(candidate) = join_within(&nested, relative).filter(|p| p.exists()) {
            return Ok(candidate);
        }
    }
    Err(AnalysisError::NotFound(path))
}

/// A selected file and its full content
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelevantFile {
    pub path: String,
    pub content: String,
}

/// Everything forwarded to the assistant for one feature request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureContext {
    pub request: String,
    pub component_count: usize,
    pub dependency_file_count: usize,
    pub files: Vec<RelevantFile>,
    pub dependencies: DependencyGraph,
}

impl FeatureContext {
    pub fn build(
        request: &str,
        analysis: &AnalysisResult,
        project_root: &Path,
        max_files: usize,
    ) -> Self {
        Self {
            request: request.to_string(),
            component_count: analysis.components.len(),
            dependency_file_count: analysis.dependencies.len(),
            files: select_relevant_files(request, analysis, project_root, max_files),
            dependencies: analysis.dependencies.clone(),
        }
    }
}

/// Component files first (first-seen order), then graph keys not yet listed
pub fn candidate_files(analysis: &AnalysisResult) -> Vec<String> {
    let mut files: Vec<String> = Vec::new();
    let paths = analysis
        .components
        .iter()
        .map(|c| &c.file_path)
        .chain(analysis.dependencies.keys());
    for path in paths {
        if !files.contains(path) {
            files.push(path.clone());
        }
    }
    files
}

/// Keyword relevance of a path; zero means irrelevant
pub fn score_path(path: &str, keywords: &[String]) -> u32 {
    let lower = path.to_lowercase();
    let mut score = keywords
        .iter()
        .filter(|k| lower.contains(k.as_str()))
        .count() as u32
        * 2;
    if path.contains("/components/") {
        score += 1;
    }
    if path.contains("/pages/") {
        score += 1;
    }
    if ["App.", "index.", "main."].iter().any(|m| path.contains(m)) {
        score += 3;
    }
    score
}

/// Rank candidate files against `request` and read the best `max_files`
///
/// Files that cannot be read are skipped with a warning.
pub fn select_relevant_files(
    request: &str,
    analysis: &AnalysisResult,
    project_root: &Path,
    max_files: usize,
) -> Vec<RelevantFile> {
    let logger = Logger;
    let keywords: Vec<String> = request
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let mut scored: Vec<(String, u32)> = candidate_files(analysis)
        .into_iter()
        .map(|path| {
            let score = score_path(&path, &keywords);
            (path, score)
        })
        .filter(|(_, score)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    scored
        .into_iter()
        .take(max_files)
        .filter_map(|(path, _)| match read_project_file(project_root, &path) {
            Ok(content) => Some(RelevantFile { path, content }),
            Err(e) => {
                logger.warn(
                    &analysis.project_id,
                    &format!("Failed to read {path}: {e}"),
                );
                None
            }
        })
        .collect()
}

/// Compact text rendering of a [`FeatureContext`]
pub fn render_digest(context: &FeatureContext, snippet_chars: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "FEATURE REQUEST: {}", context.request);
    let _ = writeln!(out);
    let _ = writeln!(out, "PROJECT STRUCTURE:");
    let _ = writeln!(out, "- Total Components: {}", context.component_count);
    let _ = writeln!(out, "- Total Files: {}", context.dependency_file_count);
    let _ = writeln!(out);
    let _ = writeln!(out, "RELEVANT FILES:");
    for file in &context.files {
        let _ = writeln!(out, "### {}", file.path);
        let _ = writeln!(out, "```");
        let _ = writeln!(out, "{}", truncate_chars(&file.content, snippet_chars));
        let _ = writeln!(out, "```");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "DEPENDENCIES:");
    for (file, imports) in &context.dependencies {
        if imports.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} -> {}", file, imports.join(", "));
    }
    out
}
