// GitHub API module.
// Provides client and types for interacting with the GitHub REST and GraphQL APIs.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{GitHubClient, format_reset_time};
pub use types::*;
