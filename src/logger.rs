//! Console logging with consistent per-project formatting

use colored::*;

/// Logger for pipeline operations with consistent formatting
///
/// Every line is prefixed with the project id in cyan/bold so interleaved
/// output from concurrent runs stays attributable.
///
/// ## Example
///
/// ```rust,no_run
/// use codesight::logger::Logger;
///
/// let logger = Logger::default();
/// logger.info("4f1c2a9e", "Extracting archive");
/// logger.success("4f1c2a9e", "Analysis complete");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl Logger {
    pub fn info(&self, project_id: &str, msg: &str) {
        eprintln!("{} | {}", project_id.cyan().bold(), msg);
    }

    pub fn success(&self, project_id: &str, msg: &str) {
        eprintln!("{} | {}", project_id.cyan().bold(), msg.green());
    }

    pub fn warn(&self, project_id: &str, msg: &str) {
        eprintln!("{} | {}", project_id.cyan().bold(), msg.yellow());
    }

    pub fn error(&self, project_id: &str, msg: &str) {
        eprintln!("{} | {}", project_id.cyan().bold(), msg.red());
    }
}
