//! Git operations using the system git binary
//!
//! ## Sub-modules
//!
//! - [`clone`]: shallow cloning behind the [`GitTransport`] seam
//!   - `RepositoryCloner::clone_repository()` - clone with retry and classification
//!   - `authenticated_url()` - embed a token for known hosts
//!
//! - [`retry`]: the [`RetryPolicy`] value driving attempts and backoff

pub mod clone;
pub mod retry;

pub use clone::{CloneReport, GitTransport, RepositoryCloner, SystemGit, authenticated_url};
pub use retry::RetryPolicy;
