// Statistics aggregator.
// Derives account totals and a language breakdown from the profile and repository list.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::cache::{CacheStore, read_cached, stats_key, write_cached};
use crate::error::Result;
use crate::github::endpoints::get_user;
use crate::github::{LanguageStat, Repository, Upstream, UserProfile, UserStats};

use super::GitHubSettings;
use super::languages::language_color;
use super::repos::RepositoryFetcher;

/// Languages kept in the breakdown.
pub const TOP_LANGUAGES: usize = 10;

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Per-language share of the repositories that declare a language.
///
/// Ordered by count, most used first; equal counts keep first-seen order.
pub fn language_breakdown(repos: &[Repository]) -> Vec<LanguageStat> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for language in repos.iter().filter_map(|repo| repo.language.as_deref()) {
        match index.get(language) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(language, counts.len());
                counts.push((language, 1));
            }
        }
    }

    let tagged: usize = counts.iter().map(|(_, count)| count).sum();
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .take(TOP_LANGUAGES)
        .map(|(name, count)| LanguageStat {
            name: name.to_string(),
            count,
            percentage: round_to_tenth(count as f64 * 100.0 / tagged as f64),
            color: language_color(name).to_string(),
        })
        .collect()
}

/// Assemble a statistics snapshot stamped with `now`.
pub fn summarize(profile: &UserProfile, repos: &[Repository], now: DateTime<Utc>) -> UserStats {
    let total_repos = repos.len();

    UserStats {
        total_repos,
        total_stars: repos.iter().map(|r| r.stargazers_count).sum(),
        total_forks: repos.iter().map(|r| r.forks_count).sum(),
        public_repos: profile.public_repos.unwrap_or(total_repos as u64),
        followers: profile.followers.unwrap_or_default(),
        following: profile.following.unwrap_or_default(),
        languages: language_breakdown(repos),
        last_updated: now,
    }
}

#[derive(Clone)]
pub struct StatisticsAggregator {
    repos: RepositoryFetcher,
    upstream: Arc<dyn Upstream>,
    cache: Arc<dyn CacheStore>,
    settings: Arc<GitHubSettings>,
}

impl StatisticsAggregator {
    pub fn new(
        repos: RepositoryFetcher,
        upstream: Arc<dyn Upstream>,
        cache: Arc<dyn CacheStore>,
        settings: Arc<GitHubSettings>,
    ) -> Self {
        Self {
            repos,
            upstream,
            cache,
            settings,
        }
    }

    /// Account statistics, served from cache when fresh.
    pub async fn get_user_statistics(&self) -> Result<UserStats> {
        let account = self.settings.account()?;
        let key = stats_key(account);

        if let Some(stats) = read_cached::<UserStats>(self.cache.as_ref(), &key) {
            info!(account, "returning cached stats data");
            return Ok(stats);
        }

        let stats = self.compute(account).await.map_err(|e| {
            error!(account, error = %e, "error fetching user stats");
            e.context("Failed to fetch user statistics")
        })?;

        if let Err(e) = write_cached(self.cache.as_ref(), &key, &stats, self.settings.stats_ttl) {
            warn!(key = %key, error = %e, "failed to cache user statistics");
        }
        info!(
            account,
            total_repos = stats.total_repos,
            total_stars = stats.total_stars,
            "fetched and cached user statistics"
        );

        Ok(stats)
    }

    async fn compute(&self, account: &str) -> Result<UserStats> {
        let profile = get_user(self.upstream.as_ref(), account).await?;
        let repos = self.repos.list_repositories().await?;
        Ok(summarize(&profile, &repos, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryStore, repos_key};
    use crate::error::ErrorKind;
    use crate::service::testing::{FakeUpstream, repo_json};
    use serde_json::{Value, json};

    fn repo(id: u64, stars: u64, language: Option<&str>) -> Repository {
        let raw = serde_json::from_value(repo_json(
            id,
            stars,
            language,
            "2024-01-01T00:00:00Z",
            false,
        ))
        .unwrap();
        Repository::from_raw(raw, "octocat").unwrap()
    }

    fn aggregator(upstream: Arc<FakeUpstream>, cache: Arc<MemoryStore>) -> StatisticsAggregator {
        let settings = Arc::new(GitHubSettings::new(Some("octocat".to_string()), true));
        let repos = RepositoryFetcher::new(upstream.clone(), cache.clone(), settings.clone());
        StatisticsAggregator::new(repos, upstream, cache, settings)
    }

    fn page(repos: &[(u64, u64, Option<&str>)]) -> Value {
        Value::Array(
            repos
                .iter()
                .map(|&(id, stars, language)| {
                    repo_json(id, stars, language, "2024-01-01T00:00:00Z", false)
                })
                .collect(),
        )
    }

    #[test]
    fn test_percentages_over_tagged_repositories() {
        let repos = vec![
            repo(1, 0, Some("A")),
            repo(2, 0, Some("A")),
            repo(3, 0, Some("B")),
            repo(4, 0, Some("A")),
            repo(5, 0, None),
        ];

        let languages = language_breakdown(&repos);

        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].name, "A");
        assert_eq!(languages[0].count, 3);
        assert_eq!(languages[0].percentage, 75.0);
        assert_eq!(languages[1].name, "B");
        assert_eq!(languages[1].percentage, 25.0);
        assert_eq!(languages[1].color, "#586069");
    }

    #[test]
    fn test_rounds_to_one_decimal() {
        let repos = vec![
            repo(1, 0, Some("Rust")),
            repo(2, 0, Some("Go")),
            repo(3, 0, Some("Python")),
        ];

        let languages = language_breakdown(&repos);
        let total: f64 = languages.iter().map(|l| l.percentage).sum();

        assert!(languages.iter().all(|l| l.percentage == 33.3));
        assert!((total - 100.0).abs() <= 0.5);
        assert_eq!(languages[0].color, "#dea584");
    }

    #[test]
    fn test_top_ten_with_stable_ties() {
        let names = [
            "L0", "L1", "L2", "L3", "L4", "L5", "L6", "L7", "L8", "L9", "L10", "L11",
        ];
        let mut repos: Vec<Repository> = names
            .iter()
            .enumerate()
            .map(|(i, name)| repo(i as u64, 0, Some(name)))
            .collect();
        repos.push(repo(100, 0, Some("L11")));

        let languages = language_breakdown(&repos);

        assert_eq!(languages.len(), TOP_LANGUAGES);
        assert_eq!(languages[0].name, "L11");
        assert_eq!(languages[0].count, 2);
        let rest: Vec<&str> = languages[1..].iter().map(|l| l.name.as_str()).collect();
        assert_eq!(rest, vec!["L0", "L1", "L2", "L3", "L4", "L5", "L6", "L7", "L8"]);
        for pair in languages.windows(2) {
            assert!(pair[0].count >= pair[1].count);
        }
    }

    #[test]
    fn test_no_languages() {
        assert!(language_breakdown(&[repo(1, 0, None)]).is_empty());
        assert!(language_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_summarize_totals_and_profile_fallbacks() {
        let repos = vec![repo(1, 4, Some("Rust")), repo(2, 6, None)];
        let now = Utc::now();

        let stats = summarize(&UserProfile::default(), &repos, now);

        assert_eq!(stats.total_repos, 2);
        assert_eq!(stats.total_stars, 10);
        assert_eq!(stats.total_forks, 2);
        assert_eq!(stats.public_repos, 2);
        assert_eq!(stats.followers, 0);
        assert_eq!(stats.following, 0);
        assert_eq!(stats.last_updated, now);
    }

    #[tokio::test]
    async fn test_statistics_from_upstream() {
        let upstream = Arc::new(FakeUpstream::new(
            json!({"public_repos": 12, "followers": 40, "following": 2}),
            vec![page(&[
                (1, 3, Some("A")),
                (2, 1, Some("A")),
                (3, 0, Some("B")),
                (4, 5, Some("A")),
            ])],
        ));
        let aggregator = aggregator(upstream.clone(), Arc::new(MemoryStore::new()));

        let stats = aggregator.get_user_statistics().await.unwrap();

        assert_eq!(stats.total_repos, 4);
        assert_eq!(stats.total_stars, 9);
        assert_eq!(stats.public_repos, 12);
        assert_eq!(stats.followers, 40);
        assert_eq!(stats.languages[0].percentage, 75.0);
        assert_eq!(stats.languages[1].percentage, 25.0);

        let again = aggregator.get_user_statistics().await.unwrap();
        assert_eq!(again, stats);
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test]
    async fn test_reuses_cached_repositories() {
        let upstream = Arc::new(FakeUpstream::with_pages(vec![page(&[(1, 1, Some("Rust"))])]));
        let cache = Arc::new(MemoryStore::new());
        let aggregator = aggregator(upstream.clone(), cache.clone());

        aggregator.repos.list_repositories().await.unwrap();
        aggregator.get_user_statistics().await.unwrap();

        assert_eq!(upstream.repo_calls(), 1);
    }

    #[tokio::test]
    async fn test_profile_failure_is_upstream_error_and_caches_nothing() {
        let upstream = Arc::new(FakeUpstream::with_pages(vec![page(&[(1, 1, None)])]));
        upstream.fail_profile(true);
        let cache = Arc::new(MemoryStore::new());
        let aggregator = aggregator(upstream, cache.clone());

        let err = aggregator.get_user_statistics().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("Failed to fetch user statistics"));
        assert_eq!(cache.get(&stats_key("octocat")).unwrap(), None);
    }

    #[tokio::test]
    async fn test_repository_failure_keeps_existing_repos_entry() {
        let upstream = Arc::new(FakeUpstream::with_pages(vec![page(&[(1, 1, None)])]));
        let cache = Arc::new(MemoryStore::new());
        let aggregator = aggregator(upstream.clone(), cache.clone());

        aggregator.repos.list_repositories().await.unwrap();
        let cached = cache.get(&repos_key("octocat")).unwrap();
        upstream.fail_profile(true);

        assert!(aggregator.get_user_statistics().await.is_err());
        assert_eq!(cache.get(&repos_key("octocat")).unwrap(), cached);
    }
}
