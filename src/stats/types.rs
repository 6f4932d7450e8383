// Aggregated statistics types.
// This is the shape that is cached, printed as JSON and rendered by the dashboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of repositories kept in the ranked top list.
pub const TOP_REPOS_LIMIT: usize = 6;

/// Number of monthly points in the contribution series.
pub const CONTRIBUTION_MONTHS: u32 = 12;

/// Everything the analytics panel shows for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStats {
    /// Monthly contribution counts, oldest month first.
    pub contributions: Vec<ContributionPoint>,
    /// Language name to total bytes across all repositories.
    pub languages: BTreeMap<String, u64>,
    pub stats: Totals,
    /// At most [`TOP_REPOS_LIMIT`] repositories, ranked by stars plus forks.
    pub top_repos: Vec<TopRepo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionPoint {
    /// Month label such as `Mar 2026`.
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub public_repos: u64,
    pub stars: u64,
    pub forks: u64,
    pub issues: u64,
    pub pull_requests: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRepo {
    pub name: String,
    pub stars: u64,
    pub forks: u64,
    pub url: String,
}

impl TopRepo {
    /// Ranking score used for ordering.
    pub fn score(&self) -> u64 {
        self.stars + self.forks
    }
}

impl AggregatedStats {
    /// Total bytes across all languages.
    pub fn language_bytes(&self) -> u64 {
        self.languages.values().sum()
    }

    /// Languages sorted by byte count, largest first, with their share in percent.
    pub fn language_shares(&self) -> Vec<(&str, u64, f64)> {
        let total = self.language_bytes();
        let mut shares: Vec<(&str, u64, f64)> = self
            .languages
            .iter()
            .map(|(name, bytes)| {
                let pct = if total == 0 {
                    0.0
                } else {
                    *bytes as f64 * 100.0 / total as f64
                };
                (name.as_str(), *bytes, pct)
            })
            .collect();
        shares.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_format() {
        let stats = AggregatedStats {
            contributions: vec![ContributionPoint {
                date: "Jan 2026".to_string(),
                count: 4,
            }],
            languages: BTreeMap::from([("Rust".to_string(), 10)]),
            stats: Totals {
                public_repos: 3,
                stars: 2,
                forks: 1,
                issues: 0,
                pull_requests: 9,
            },
            top_repos: vec![],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["stats"]["publicRepos"], 3);
        assert_eq!(json["stats"]["pullRequests"], 9);
        assert_eq!(json["contributions"][0]["date"], "Jan 2026");
        assert!(json["topRepos"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_language_shares() {
        let stats = AggregatedStats {
            languages: BTreeMap::from([
                ("A".to_string(), 25),
                ("B".to_string(), 75),
            ]),
            ..Default::default()
        };
        let shares = stats.language_shares();
        assert_eq!(shares[0].0, "B");
        assert!((shares[0].2 - 75.0).abs() < f64::EPSILON);
        assert!((shares[1].2 - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_language_shares_empty() {
        assert!(AggregatedStats::default().language_shares().is_empty());
    }
}
