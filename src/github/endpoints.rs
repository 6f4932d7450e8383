// GitHub API endpoint functions.
// Provides typed methods for the profile, repository, language and contribution data.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::error::{AppError, Result};

use super::client::GitHubClient;
use super::types::{
    ContributionDay, ContributionsResponse, Languages, RateLimit, RateLimitResponse, Repository,
    SearchCount, User,
};

/// Maximum repositories requested in a single listing.
pub const MAX_REPOS: u32 = 100;

const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!, $from: DateTime!, $to: DateTime!) {
    user(login: $login) {
        contributionsCollection(from: $from, to: $to) {
            contributionCalendar {
                weeks {
                    contributionDays {
                        date
                        contributionCount
                    }
                }
            }
        }
    }
}
"#;

impl GitHubClient {
    /// Get the core rate limit bucket.
    pub async fn get_rate_limit(&self) -> Result<RateLimit> {
        let response = self.get("/rate_limit").await?;
        let body: RateLimitResponse = response.json().await?;
        Ok(body.resources.core)
    }

    /// Get a user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<User> {
        let response = self.get(&format!("/users/{}", username)).await?;
        let user: User = response.json().await?;
        Ok(user)
    }

    /// Get a user's public repositories, most starred first.
    pub async fn get_user_repos(&self, username: &str) -> Result<Vec<Repository>> {
        let params = [
            ("per_page", MAX_REPOS.to_string()),
            ("sort", "stars".to_string()),
        ];
        let response = self
            .get_with_params(&format!("/users/{}/repos", username), &params)
            .await?;
        let repos: Vec<Repository> = response.json().await?;
        Ok(repos)
    }

    /// Get the language byte breakdown of a repository.
    ///
    /// Returns `None` when the API answers with a non-success status.
    pub async fn get_repo_languages(&self, repo: &Repository) -> Result<Option<Languages>> {
        let response = self.send_unchecked(&repo.languages_url).await?;
        if !response.status().is_success() {
            tracing::warn!(
                repo = %repo.name,
                status = %response.status(),
                "Skipping language breakdown"
            );
            return Ok(None);
        }
        let languages: Languages = response.json().await?;
        Ok(Some(languages))
    }

    /// Count pull requests authored by a user across GitHub.
    pub async fn count_pull_requests(&self, username: &str) -> Result<u64> {
        let params = [
            ("q", format!("author:{} type:pr", username)),
            ("per_page", "1".to_string()),
        ];
        let response = self.get_with_params("/search/issues", &params).await?;
        let body: SearchCount = response.json().await?;
        Ok(body.total_count)
    }

    /// Get the daily contribution calendar for a window (at most one year).
    pub async fn get_contribution_days(
        &self,
        username: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ContributionDay>> {
        let body = json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": {
                "login": username,
                "from": from.to_rfc3339(),
                "to": to.to_rfc3339(),
            },
        });
        let response = self.post_json(self.graphql_url(), &body).await?;
        let parsed: ContributionsResponse = response.json().await?;

        if let Some(errors) = &parsed.errors {
            return Err(AppError::Other(format!("GraphQL reported errors: {}", errors)));
        }

        Ok(parsed.into_days())
    }
}
