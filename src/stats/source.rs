// Data source seam for the aggregator.
// The GitHub client is the production source; tests substitute a fake.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::github::{ContributionDay, GitHubClient, Languages, RateLimit, Repository, User};

/// Remote data the aggregator needs for one fetch cycle.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Current core rate limit bucket.
    async fn rate_limit(&self) -> Result<RateLimit>;

    /// Public profile of `username`.
    async fn user(&self, username: &str) -> Result<User>;

    /// Public repositories of `username`, capped at 100.
    async fn repos(&self, username: &str) -> Result<Vec<Repository>>;

    /// Language breakdown for one repository, or `None` if the host declined.
    async fn languages(&self, repo: &Repository) -> Result<Option<Languages>>;

    /// Number of pull requests authored by `username`.
    async fn pull_request_count(&self, username: &str) -> Result<u64>;

    /// Daily contributions of `username` between `from` and `to`.
    async fn contribution_days(
        &self,
        username: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContributionDay>>;
}

#[async_trait]
impl StatsSource for GitHubClient {
    async fn rate_limit(&self) -> Result<RateLimit> {
        self.get_rate_limit().await
    }

    async fn user(&self, username: &str) -> Result<User> {
        self.get_user(username).await
    }

    async fn repos(&self, username: &str) -> Result<Vec<Repository>> {
        self.get_user_repos(username).await
    }

    async fn languages(&self, repo: &Repository) -> Result<Option<Languages>> {
        self.get_repo_languages(repo).await
    }

    async fn pull_request_count(&self, username: &str) -> Result<u64> {
        self.count_pull_requests(username).await
    }

    async fn contribution_days(
        &self,
        username: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContributionDay>> {
        self.get_contribution_days(username, from, to).await
    }
}
