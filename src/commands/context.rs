//! Context command implementation

use super::{Command, CommandContext};
use crate::context::{FeatureContext, render_digest};
use crate::store::ResultStore;
use anyhow::Result;
use async_trait::async_trait;

/// Context command for printing the feature-context digest of a project
pub struct ContextCommand {
    pub project_id: String,
    pub request: Vec<String>,
    /// Print the context as JSON instead of the text digest
    pub json: bool,
}

#[async_trait]
impl Command for ContextCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let settings = &context.settings;
        let analysis = ResultStore::new(settings.clone()).load(&self.project_id)?;

        let request = self.request.join(" ");
        let project_root = settings.project_dir(&self.project_id);
        let max_files = settings.limits.max_context_files;
        let feature = tokio::task::spawn_blocking(move || {
            FeatureContext::build(&request, &analysis, &project_root, max_files)
        })
        .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&feature)?);
        } else {
            print!(
                "{}",
                render_digest(&feature, settings.limits.context_snippet_chars)
            );
        }
        Ok(())
    }
}
