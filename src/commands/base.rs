//! Base types and traits for the command pattern

use crate::analyzer::ProjectAnalyzer;
use crate::config::Settings;
use anyhow::Result;

/// Context passed to all commands containing shared configuration
#[derive(Clone)]
pub struct CommandContext {
    /// The loaded settings
    pub settings: Settings,
}

impl CommandContext {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Analyzer backed by the system git binary
    pub fn analyzer(&self) -> ProjectAnalyzer {
        ProjectAnalyzer::new(self.settings.clone())
    }
}

/// Trait that all commands must implement
#[async_trait::async_trait]
pub trait Command {
    /// Execute the command with the given context
    async fn execute(&self, context: &CommandContext) -> Result<()>;
}
