// ghfolio entry point.
// Parses the CLI, sets up logging and configuration, and dispatches to the dashboard or a command.

mod app;
mod auth;
mod cache;
mod config;
mod error;
mod github;
mod stats;
mod ui;

use std::fs::OpenOptions;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::auth::AdminGate;
use crate::cache::{CacheEntry, FileStore, KeyValueStore, read_entry};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::github::GitHubClient;
use crate::stats::{AggregatedStats, Aggregator, CACHE_KEY};

/// GitHub statistics for a portfolio: repositories, stars, languages and contributions.
#[derive(Debug, Parser)]
#[command(name = "ghfolio", version, about)]
struct Cli {
    /// GitHub username (overrides github.username)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Print the statistics as JSON instead of opening the dashboard
    #[arg(long)]
    json: bool,

    /// Fetch fresh data even if the cache is fresh; a failed fetch keeps the cached entry
    #[arg(long)]
    refresh: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect or clear the statistics cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Manage the local admin flag
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// Remove the cached statistics
    Clear,
    /// Print the cached entry and its age
    Show,
}

#[derive(Debug, Subcommand)]
enum AdminAction {
    /// Set the admin flag after checking credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the admin flag
    Logout,
    /// Report whether the admin flag is set
    Status,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let dashboard = cli.command.is_none() && !cli.json;

    init_tracing(dashboard);

    let mut config = Config::load();
    if let Some(user) = cli.user.clone() {
        config.github.username = Some(user);
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "ghfolio failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Some(Command::Cache { action }) => run_cache(action, &config),
        Some(Command::Admin { action }) => run_admin(action, &config),
        None => {
            let aggregator = build_aggregator(&config)?;

            if cli.json {
                let stats = if cli.refresh {
                    aggregator.refresh().await?
                } else {
                    aggregator.load().await?
                };
                println!("{}", serde_json::to_string_pretty(&stats)?);
                Ok(())
            } else {
                run_dashboard(aggregator, cli.refresh)
            }
        }
    }
}

fn run_dashboard(aggregator: Aggregator<GitHubClient>, force_refresh: bool) -> Result<()> {
    let mut terminal = ratatui::init();
    let mut app = App::new(aggregator);
    let result = app.run(&mut terminal, force_refresh);
    ratatui::restore();
    result.map_err(AppError::from)
}

fn run_cache(action: CacheAction, config: &Config) -> Result<()> {
    let store = user_store(config)?;
    match action {
        CacheAction::Clear => {
            build_aggregator(config)?.invalidate()?;
            println!("Cleared cached statistics in {}", store.root().display());
        }
        CacheAction::Show => match read_entry::<AggregatedStats>(&store, CACHE_KEY)? {
            Some(entry) => print_entry(&entry, config),
            None => println!("No cached statistics"),
        },
    }
    Ok(())
}

fn print_entry(entry: &CacheEntry<AggregatedStats>, config: &Config) {
    let now = chrono::Utc::now();
    let age = entry.age(now);
    let state = if entry.is_expired(config.cache_ttl(), now) {
        "expired"
    } else {
        "fresh"
    };
    println!(
        "Cached {}m{}s ago ({}), {} languages, {} top repositories",
        age.as_secs() / 60,
        age.as_secs() % 60,
        state,
        entry.data.languages.len(),
        entry.data.top_repos.len()
    );
}

fn run_admin(action: AdminAction, config: &Config) -> Result<()> {
    let gate = AdminGate::new(Arc::new(app_store(config)?), &config.admin);
    match action {
        AdminAction::Login { email, password } => {
            gate.login(&email, &password)?;
            println!("Logged in as admin");
        }
        AdminAction::Logout => {
            gate.logout()?;
            println!("Logged out");
        }
        AdminAction::Status => {
            let status = if gate.is_admin()? { "admin" } else { "not admin" };
            println!("{}", status);
        }
    }
    Ok(())
}

fn build_aggregator(config: &Config) -> Result<Aggregator<GitHubClient>> {
    let username = config.username()?.to_string();
    let client = config
        .github_token()
        .map(|token| GitHubClient::with_base_url(token, config.api_url()))
        .transpose()?;
    if client.is_none() {
        tracing::warn!("No GitHub token configured; only cached statistics can be shown");
    }

    let store: Arc<dyn KeyValueStore> = Arc::new(user_store(config)?);
    Ok(Aggregator::new(client, store, username).with_ttl(config.cache_ttl()))
}

fn cache_root(config: &Config) -> Result<PathBuf> {
    config
        .cache
        .dir
        .clone()
        .or_else(cache::cache_dir)
        .ok_or_else(|| AppError::Config("could not determine a cache directory".to_string()))
}

fn user_store(config: &Config) -> Result<FileStore> {
    let username = cache::sanitize_name(config.username()?);
    Ok(FileStore::new(cache_root(config)?.join("users").join(username)))
}

fn app_store(config: &Config) -> Result<FileStore> {
    Ok(FileStore::new(cache_root(config)?.join("app")))
}

/// Initialize tracing. The dashboard owns the terminal, so it logs to a file instead of stderr.
fn init_tracing(dashboard: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("ghfolio=info"),
    };

    if dashboard {
        let Some(path) = cache::log_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
            return;
        };
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_login() {
        let cli = Cli::parse_from([
            "ghfolio", "admin", "login", "--email", "a@b.c", "--password", "pw",
        ]);
        assert!(matches!(
            cli.command,
            Some(Command::Admin {
                action: AdminAction::Login { .. }
            })
        ));
    }

    #[test]
    fn test_parse_json_flags() {
        let cli = Cli::parse_from(["ghfolio", "--user", "octocat", "--json", "--refresh"]);
        assert_eq!(cli.user.as_deref(), Some("octocat"));
        assert!(cli.json && cli.refresh && cli.command.is_none());
    }

    #[test]
    fn test_user_store_uses_configured_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.github.username = Some("octocat".to_string());
        config.cache.dir = Some(temp_dir.path().to_path_buf());

        let store = user_store(&config).unwrap();
        assert_eq!(store.root(), temp_dir.path().join("users").join("octocat"));
    }

    #[test]
    fn test_user_store_rejects_parent_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.github.username = Some("..".to_string());
        config.cache.dir = Some(temp_dir.path().to_path_buf());

        assert!(matches!(user_store(&config), Err(AppError::Config(_))));
    }
}
