//! ZIP archive materialization
//!
//! - [`validate`]: boundary checks (size, file count, expanded size) that run
//!   before anything touches disk
//! - [`extract`]: safe extraction into a project directory

pub mod extract;
pub mod validate;

pub use extract::{ExtractionReport, extract_archive, remove_node_modules};
pub use validate::{ArchiveReport, inspect_archive, validate_archive};
