//! Configuration file support for ghfolio.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `GHFOLIO_`, e.g., `GHFOLIO_GITHUB_USERNAME`)
//! 3. Local config file (./ghfolio.toml)
//! 4. Config file (~/.config/ghfolio/config.toml)
//! 5. Built-in defaults
//!
//! `GITHUB_TOKEN` is honored when no token is configured any other way.
//!
//! Example config file:
//! ```toml
//! [github]
//! username = "octocat"
//! token = "ghp_..."                       # or GHFOLIO_GITHUB_TOKEN / GITHUB_TOKEN
//! endpoint = "https://api.github.com"     # optional, this is the default
//!
//! [cache]
//! ttl = 30                               # minutes
//!
//! [admin]
//! email = "me@example.com"
//! password = "..."
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use crate::cache::DEFAULT_TTL;
use crate::error::{AppError, Result};
use crate::github::client::GITHUB_API_BASE;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// Cache configuration.
    pub cache: CacheConfig,
    /// Admin flag credentials.
    pub admin: AdminConfig,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// User whose statistics are shown.
    pub username: Option<String>,
    /// GitHub API token.
    /// Can also be set via GHFOLIO_GITHUB_TOKEN or GITHUB_TOKEN.
    pub token: Option<String>,
    /// REST API root, for GitHub Enterprise.
    pub endpoint: Option<String>,
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Minutes before cached statistics are refetched.
    pub ttl: u64,
    /// Override for the cache directory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL.as_secs() / 60,
            dir: None,
        }
    }
}

/// Credentials for the local admin flag. Login is disabled unless both are set.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path() {
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("ghfolio.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./ghfolio.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g., GHFOLIO_GITHUB_TOKEN -> github.token, GHFOLIO_CACHE_TTL -> cache.ttl
        builder = builder.add_source(
            Environment::with_prefix("GHFOLIO")
                .separator("_")
                .try_parsing(true),
        );

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.apply_legacy_env();
        config
    }

    /// Fall back to the conventional `GITHUB_TOKEN` variable.
    fn apply_legacy_env(&mut self) {
        if self.github.token.is_none() {
            self.github.token = std::env::var("GITHUB_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty());
        }
    }

    /// Configured token, ignoring blank values.
    pub fn github_token(&self) -> Option<&str> {
        self.github
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn api_url(&self) -> &str {
        self.github.endpoint.as_deref().unwrap_or(GITHUB_API_BASE)
    }

    /// The user to report on; required for every stats command.
    ///
    /// The name is used both in API paths and as a cache directory, so only
    /// characters GitHub allows in logins are accepted.
    pub fn username(&self) -> Result<&str> {
        let username = self
            .github
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                AppError::Config(
                    "no GitHub username: pass --user or set github.username".to_string(),
                )
            })?;

        if !is_valid_login(username) {
            return Err(AppError::Config(format!(
                "invalid GitHub username {:?}",
                username
            )));
        }
        Ok(username)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl * 60)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ghfolio").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Letters, digits, hyphens and underscores (Enterprise managed users), not starting with a hyphen.
fn is_valid_login(name: &str) -> bool {
    !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.cache_ttl(), DEFAULT_TTL);
        assert_eq!(config.api_url(), "https://api.github.com");
        assert!(config.github_token().is_none());
        assert!(matches!(config.username(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_username_rejects_path_like_names() {
        let mut config = Config::default();
        for name in ["..", ".", "octo/cat", "a b", "-leading", "x?y=1"] {
            config.github.username = Some(name.to_string());
            assert!(
                matches!(config.username(), Err(AppError::Config(_))),
                "{} should be rejected",
                name
            );
        }

        for name in ["octocat", "some-user", "emu_shortcode", "A1"] {
            config.github.username = Some(name.to_string());
            assert_eq!(config.username().unwrap(), name);
        }
    }

    #[test]
    fn test_blank_token_ignored() {
        let mut config = Config::default();
        config.github.token = Some("   ".to_string());
        assert!(config.github_token().is_none());
    }

    #[test]
    fn test_parse_toml() {
        let settings = ConfigBuilder::builder()
            .add_source(File::from_str(
                r#"
                [github]
                username = "octocat"
                [cache]
                ttl = 5
                [admin]
                email = "a@b.c"
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.username().unwrap(), "octocat");
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.admin.email.as_deref(), Some("a@b.c"));
        assert!(config.admin.password.is_none());
    }
}
