//! Utility modules for common functionality

pub mod exit_codes;
pub mod filesystem;
pub mod sanitizers;
pub mod validators;

// Re-export commonly used functions
pub use filesystem::{
    empty_directory, ensure_directory_exists, has_source_extension, is_excluded_name,
    join_within, normalize_lexically, relative_slash_path, write_atomic,
};
pub use sanitizers::{redact_secret, redact_url_credentials, truncate_chars};
pub use validators::{validate_git_url, validate_project_id};
