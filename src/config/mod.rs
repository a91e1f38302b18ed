//! Configuration management module

pub mod loader;

pub use loader::{CloneSettings, Limits, RetentionSettings, Settings};
