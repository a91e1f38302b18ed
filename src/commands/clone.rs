//! Clone command implementation

use super::{Command, CommandContext};
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// Clone command for materializing a project from a git remote
pub struct CloneCommand {
    pub url: String,
    /// Generated when not supplied
    pub project_id: Option<String>,
    pub token: Option<String>,
}

impl CloneCommand {
    pub fn project_id(&self) -> String {
        self.project_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl Command for CloneCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let project_id = self.project_id();
        let analyzer = context.analyzer();

        let target = analyzer
            .materialize_repository(&project_id, &self.url, self.token.as_deref())
            .await?;

        eprintln!("{}", format!("Cloned into {}", target.display()).green());
        println!("{project_id}");
        Ok(())
    }
}
