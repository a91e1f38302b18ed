//! CodeSight - static analysis of uploaded and cloned source projects

pub mod analysis;
pub mod analyzer;
pub mod archive;
pub mod cleanup;
pub mod commands;
pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod git;
pub mod logger;
pub mod store;
pub mod utils;

pub type Result<T> = anyhow::Result<T>;

// Re-export commonly used types
pub use analysis::{AnalysisResult, ComponentInfo, DependencyGraph, FileNode};
pub use analyzer::ProjectAnalyzer;
pub use commands::{Command, CommandContext};
pub use config::Settings;
pub use error::{AnalysisError, CloneFailure, ErrorPayload};

