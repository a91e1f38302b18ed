//! Static analysis of a materialized project
//!
//! Stages, each usable on its own:
//!
//! - [`root::effective_root`]: nested-root normalization
//! - [`tree::build_file_tree`]: bounded metadata listing
//! - [`dependencies::extract_dependencies`]: source-to-source import graph
//! - [`components::extract_components`]: component inventory
//!
//! [`crate::analyzer::ProjectAnalyzer`] sequences them into one run.

pub mod components;
pub mod dependencies;
pub mod imports;
pub mod root;
pub mod syntax;
pub mod tree;
pub mod types;
pub mod walk;

pub use components::{ComponentExtraction, Declaration, extract_components};
pub use dependencies::{
    GraphExtraction, GraphOutcome, GraphStrategy, ManualScanStrategy, ModuleGraphStrategy,
    extract_dependencies, extract_with,
};
pub use root::effective_root;
pub use tree::build_file_tree;
pub use types::{
    AnalysisResult, ComponentInfo, ComponentKind, DependencyGraph, FileNode, NodeKind,
};
