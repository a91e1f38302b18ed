//! Command implementations behind the `codesight` binary

pub mod analyze;
pub mod base;
pub mod cleanup;
pub mod clone;
pub mod context;
pub mod validate;
pub mod validators;

pub use analyze::AnalyzeCommand;
pub use base::{Command, CommandContext};
pub use cleanup::CleanupCommand;
pub use clone::CloneCommand;
pub use context::ContextCommand;
pub use validate::ValidateCommand;
