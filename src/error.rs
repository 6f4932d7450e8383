// Error types for ghfolio.
// Covers GitHub API failures, cache/store errors, configuration and admin login.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("GitHub token not found. Set GHFOLIO_GITHUB_TOKEN or GITHUB_TOKEN to continue.")]
    MissingToken,

    #[error("Failed to fetch GitHub data (HTTP {status}). Please try again.")]
    Http { status: u16 },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Admin login is disabled: no [admin] credentials configured")]
    AdminDisabled,

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
