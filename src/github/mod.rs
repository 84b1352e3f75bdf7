// GitHub API module.
// Provides the upstream client and the types read from the GitHub REST API.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GITHUB_API_BASE, GitHubClient, REQUEST_TIMEOUT, Upstream};
pub use types::*;
