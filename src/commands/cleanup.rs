//! Cleanup command implementation

use super::{Command, CommandContext};
use crate::cleanup::{LeaseRegistry, sweep};
use crate::config::RetentionSettings;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;

/// Cleanup command for one retention sweep over projects and uploads
pub struct CleanupCommand {
    /// Overrides the configured retention age
    pub max_age_hours: Option<u64>,
}

#[async_trait]
impl Command for CleanupCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let settings = &context.settings;
        let max_age = match self.max_age_hours {
            Some(max_age_hours) => RetentionSettings { max_age_hours }.max_age(),
            None => settings.retention.max_age(),
        };
        let leases = LeaseRegistry::new(&settings.projects_dir);

        let mut removed = 0;
        for dir in [&settings.projects_dir, &settings.uploads_dir] {
            let dir = dir.clone();
            let leases = leases.clone();
            let names =
                tokio::task::spawn_blocking(move || sweep(&dir, max_age, &leases)).await??;
            removed += names.len();
        }

        if removed == 0 {
            println!("{}", "Nothing to clean up".yellow());
        } else {
            println!("{}", format!("Removed {removed} expired entries").green());
        }
        Ok(())
    }
}
