// GitHub API response types.
// Defines structs for deserializing the REST and GraphQL responses we consume.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// GitHub user profile (`GET /users/{username}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub public_repos: u64,
}

/// GitHub repository as returned by the user repos listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    pub languages_url: String,
}

/// Per-repository language breakdown: language name to byte count.
pub type Languages = BTreeMap<String, u64>;

/// Body of `GET /rate_limit`.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResponse {
    pub resources: RateLimitResources,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimit,
}

/// Rate limit information, from either the rate_limit endpoint or response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    /// Reset time as a unix epoch in seconds.
    pub reset: u64,
}

/// Body of `GET /search/issues`; only the count matters.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCount {
    pub total_count: u64,
}

/// One day of the contribution calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    #[serde(rename = "contributionCount")]
    pub count: u64,
}

/// GraphQL envelope for the contribution calendar query.
#[derive(Debug, Deserialize)]
pub struct ContributionsResponse {
    pub data: Option<ContributionsData>,
    pub errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ContributionsData {
    pub user: Option<ContributionsUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsUser {
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
pub struct ContributionCalendar {
    pub weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    pub contribution_days: Vec<ContributionDay>,
}

impl ContributionsResponse {
    /// Flatten the calendar weeks into a list of days.
    pub fn into_days(self) -> Vec<ContributionDay> {
        self.data
            .and_then(|d| d.user)
            .map(|u| {
                u.contributions_collection
                    .contribution_calendar
                    .weeks
                    .into_iter()
                    .flat_map(|w| w.contribution_days)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_defaults_missing_counts() {
        let json = r#"{
            "name": "demo",
            "html_url": "https://github.com/someone/demo",
            "languages_url": "https://api.github.com/repos/someone/demo/languages"
        }"#;
        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.stargazers_count, 0);
        assert_eq!(repo.forks_count, 0);
        assert_eq!(repo.open_issues_count, 0);
    }

    #[test]
    fn test_rate_limit_response() {
        let json = r#"{"resources":{"core":{"limit":5000,"remaining":0,"used":5000,"reset":1700000000}}}"#;
        let parsed: RateLimitResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.resources.core.remaining, 0);
        assert_eq!(parsed.resources.core.reset, 1_700_000_000);
    }

    #[test]
    fn test_contributions_into_days() {
        let json = r#"{"data":{"user":{"contributionsCollection":{"contributionCalendar":{"weeks":[
            {"contributionDays":[{"date":"2026-01-04","contributionCount":3},{"date":"2026-01-05","contributionCount":0}]},
            {"contributionDays":[{"date":"2026-01-11","contributionCount":7}]}
        ]}}}}}"#;
        let parsed: ContributionsResponse = serde_json::from_str(json).unwrap();
        let days = parsed.into_days();
        assert_eq!(days.len(), 3);
        assert_eq!(days[2].count, 7);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
    }

    #[test]
    fn test_contributions_missing_user() {
        let json = r#"{"data":{"user":null}}"#;
        let parsed: ContributionsResponse = serde_json::from_str(json).unwrap();
        assert!(parsed.into_days().is_empty());
    }
}
