//! Validate command implementation

use super::{Command, CommandContext};
use crate::archive::validate_archive;
use anyhow::Result;
use async_trait::async_trait;
use colored::*;
use std::path::PathBuf;

/// Validate command for checking an archive against the upload limits
pub struct ValidateCommand {
    pub zip: PathBuf,
}

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, context: &CommandContext) -> Result<()> {
        let report = validate_archive(&self.zip, &context.settings.limits).await?;

        println!("{}", report.file_count);
        eprintln!(
            "{}",
            format!(
                "{} is valid: {} files, {} bytes uncompressed",
                self.zip.display(),
                report.file_count,
                report.uncompressed_bytes
            )
            .green()
        );
        Ok(())
    }
}
