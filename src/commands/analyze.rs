//! Analyze command implementation

use super::{Command, CommandContext};
use crate::utils::write_atomic;
use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use std::path::PathBuf;

/// Analyze command for running the pipeline on one project
pub struct AnalyzeCommand {
    pub project_id: String,
    /// Archive to extract first; defaults to `<uploads>/<id>.zip` when present
    pub zip: Option<PathBuf>,
    /// Write the result here instead of stdout
    pub output: Option<PathBuf>,
}

impl AnalyzeCommand {
    fn archive(&self, context: &CommandContext) -> Option<PathBuf> {
        self.zip.clone().or_else(|| {
            let upload = context.settings.upload_path(&self.project_id);
            upload.is_file().then_some(upload)
        })
    }
}

#[async_trait]
impl Command for AnalyzeCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let zip = self.archive(context);
        let result = context
            .analyzer()
            .analyze(&self.project_id, zip.as_deref())
            .await?;

        let json = serde_json::to_string_pretty(&result)?;
        match &self.output {
            Some(path) => {
                write_atomic(path, json.as_bytes())
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!(
                    "{}",
                    format!(
                        "Analysis of {} written to {} ({} files with dependencies, {} components)",
                        self.project_id,
                        path.display(),
                        result.dependencies.len(),
                        result.components.len()
                    )
                    .green()
                );
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}
