// Pure aggregation helpers.
// Folds repository listings, language payloads and contribution days into display data.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};

use crate::github::{ContributionDay, Languages, Repository};

use super::types::{CONTRIBUTION_MONTHS, ContributionPoint, TOP_REPOS_LIMIT, TopRepo, Totals};

/// Merge per-repository language payloads into one byte total per language.
pub fn accumulate_languages<'a, I>(payloads: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = &'a Languages>,
{
    let mut totals = BTreeMap::new();
    for payload in payloads {
        for (language, bytes) in payload {
            *totals.entry(language.clone()).or_insert(0) += bytes;
        }
    }
    totals
}

/// Sum stars, forks and open issues across repositories.
///
/// `public_repos` and `pull_requests` come from other endpoints and are left at zero.
pub fn sum_totals(repos: &[Repository]) -> Totals {
    repos.iter().fold(Totals::default(), |mut acc, repo| {
        acc.stars += repo.stargazers_count;
        acc.forks += repo.forks_count;
        acc.issues += repo.open_issues_count;
        acc
    })
}

/// Pick repositories with any stars or forks, ordered by stars plus forks.
///
/// The sort is stable, so ties keep the listing order.
pub fn rank_top_repos(repos: &[Repository]) -> Vec<TopRepo> {
    let mut candidates: Vec<TopRepo> = repos
        .iter()
        .filter(|repo| repo.stargazers_count > 0 || repo.forks_count > 0)
        .map(|repo| TopRepo {
            name: repo.name.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            url: repo.html_url.clone(),
        })
        .collect();

    candidates.sort_by(|a, b| b.score().cmp(&a.score()));
    candidates.truncate(TOP_REPOS_LIMIT);
    candidates
}

/// First day of the oldest month in the contribution window ending at `now`.
pub fn contribution_window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let start = month_start(now.date_naive())
        .checked_sub_months(Months::new(CONTRIBUTION_MONTHS - 1))
        .unwrap_or(NaiveDate::MIN);
    start.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Bucket daily contributions into monthly points, oldest first.
///
/// The series always has one point per month of the window; days outside it are ignored.
pub fn monthly_series(days: &[ContributionDay], now: DateTime<Utc>) -> Vec<ContributionPoint> {
    let current = month_start(now.date_naive());
    let months: Vec<NaiveDate> = (0..CONTRIBUTION_MONTHS)
        .rev()
        .filter_map(|back| current.checked_sub_months(Months::new(back)))
        .collect();

    let mut counts: BTreeMap<NaiveDate, u64> = months.iter().map(|m| (*m, 0)).collect();
    for day in days {
        if let Some(count) = counts.get_mut(&month_start(day.date)) {
            *count += day.count;
        }
    }

    months
        .into_iter()
        .map(|month| ContributionPoint {
            date: month.format("%b %Y").to_string(),
            count: counts.get(&month).copied().unwrap_or(0),
        })
        .collect()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
