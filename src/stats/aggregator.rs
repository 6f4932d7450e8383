// GitHub statistics aggregator.
// Serves fresh cached stats, otherwise runs one full fetch cycle and caches the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::try_join_all;

use crate::cache::{DEFAULT_TTL, KeyValueStore, read_if_valid, write_entry};
use crate::error::{AppError, Result};
use crate::github::format_reset_time;

use super::aggregate::{
    accumulate_languages, contribution_window_start, monthly_series, rank_top_repos, sum_totals,
};
use super::source::StatsSource;
use super::types::AggregatedStats;

/// Store key holding the cached [`AggregatedStats`].
pub const CACHE_KEY: &str = "github_analytics_data";

/// Produces [`AggregatedStats`] for one user, consulting the cache first.
pub struct Aggregator<S> {
    /// `None` when no API token is configured.
    source: Option<S>,
    store: Arc<dyn KeyValueStore>,
    username: String,
    ttl: Duration,
}

impl<S> Aggregator<S> {
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl<S: StatsSource> Aggregator<S> {
    pub fn new(source: Option<S>, store: Arc<dyn KeyValueStore>, username: impl Into<String>) -> Self {
        Self {
            source,
            store,
            username: username.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the cache TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Cached stats, if an entry younger than the TTL exists.
    pub fn cached(&self) -> Result<Option<AggregatedStats>> {
        read_if_valid(self.store.as_ref(), CACHE_KEY, self.ttl, Utc::now())
    }

    /// Drop the cached entry so the next load fetches.
    pub fn invalidate(&self) -> Result<()> {
        self.store.clear(CACHE_KEY)
    }

    /// Return cached stats when fresh, otherwise fetch, cache and return new stats.
    ///
    /// Any failure aborts the whole cycle; nothing partial is cached.
    pub async fn load(&self) -> Result<AggregatedStats> {
        if let Some(stats) = self.cached()? {
            tracing::debug!(user = %self.username, "Serving GitHub stats from cache");
            return Ok(stats);
        }

        self.refresh().await
    }

    /// Fetch regardless of the cache. The stored entry is replaced only on success,
    /// so a failed refresh leaves the previous entry in place.
    pub async fn refresh(&self) -> Result<AggregatedStats> {
        let source = self.source.as_ref().ok_or(AppError::MissingToken)?;

        tracing::info!(user = %self.username, "Fetching GitHub stats");
        let stats = self.fetch(source).await?;

        write_entry(self.store.as_ref(), CACHE_KEY, &stats, Utc::now())?;
        tracing::info!(
            user = %self.username,
            languages = stats.languages.len(),
            top_repos = stats.top_repos.len(),
            "Cached GitHub stats"
        );

        Ok(stats)
    }

    async fn fetch(&self, source: &S) -> Result<AggregatedStats> {
        let rate_limit = source.rate_limit().await?;
        tracing::debug!(
            remaining = rate_limit.remaining,
            limit = rate_limit.limit,
            "GitHub rate limit"
        );
        if rate_limit.remaining == 0 {
            return Err(AppError::RateLimited {
                reset_at: format_reset_time(rate_limit.reset),
            });
        }

        let now = Utc::now();
        let username = self.username.as_str();
        let (user, repos, pull_requests, days) = tokio::try_join!(
            source.user(username),
            source.repos(username),
            source.pull_request_count(username),
            source.contribution_days(username, contribution_window_start(now), now),
        )?;

        tracing::debug!(repos = repos.len(), "Fetching language breakdowns");
        let payloads = try_join_all(repos.iter().map(|repo| source.languages(repo))).await?;

        let mut totals = sum_totals(&repos);
        totals.public_repos = user.public_repos;
        totals.pull_requests = pull_requests;

        Ok(AggregatedStats {
            contributions: monthly_series(&days, now),
            languages: accumulate_languages(payloads.iter().flatten()),
            stats: totals,
            top_repos: rank_top_repos(&repos),
        })
    }
}
