// GitHub data services.
// Cached repository listing, statistics aggregation and cache control.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, REPOS_TTL, STATS_TTL};
use crate::error::{FolioError, Result};
use crate::github::Upstream;

pub mod health;
pub mod languages;
pub mod refresh;
pub mod repos;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use health::HealthReport;
pub use refresh::{CacheController, RefreshSummary};
pub use repos::RepositoryFetcher;
pub use stats::StatisticsAggregator;

/// Default repositories requested per page.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Hard cap on pages requested per fetch.
pub const MAX_PAGES: u32 = 10;

/// Settings shared by the GitHub services.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    /// Tracked GitHub account.
    pub account: Option<String>,
    pub has_token: bool,
    pub per_page: u32,
    pub max_pages: u32,
    pub repos_ttl: Duration,
    pub stats_ttl: Duration,
}

impl GitHubSettings {
    pub fn new(account: Option<String>, has_token: bool) -> Self {
        Self {
            account: account.filter(|a| !a.trim().is_empty()),
            has_token,
            per_page: DEFAULT_PER_PAGE,
            max_pages: MAX_PAGES,
            repos_ttl: REPOS_TTL,
            stats_ttl: STATS_TTL,
        }
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// The configured account, or a configuration error.
    pub fn account(&self) -> Result<&str> {
        self.account
            .as_deref()
            .ok_or_else(|| FolioError::Configuration("GitHub username not configured".to_string()))
    }
}

/// Everything the HTTP layer needs to serve GitHub data.
#[derive(Clone)]
pub struct GitHubService {
    settings: Arc<GitHubSettings>,
    upstream: Arc<dyn Upstream>,
    repos: RepositoryFetcher,
    stats: StatisticsAggregator,
    controller: CacheController,
}

impl GitHubService {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        cache: Arc<dyn CacheStore>,
        settings: GitHubSettings,
    ) -> Self {
        let settings = Arc::new(settings);
        let repos = RepositoryFetcher::new(upstream.clone(), cache.clone(), settings.clone());
        let stats = StatisticsAggregator::new(
            repos.clone(),
            upstream.clone(),
            cache.clone(),
            settings.clone(),
        );
        let controller = CacheController::new(repos.clone(), stats.clone(), cache, settings.clone());

        Self {
            settings,
            upstream,
            repos,
            stats,
            controller,
        }
    }

    pub fn settings(&self) -> &GitHubSettings {
        &self.settings
    }

    pub fn repositories(&self) -> &RepositoryFetcher {
        &self.repos
    }

    pub fn statistics(&self) -> &StatisticsAggregator {
        &self.stats
    }

    pub fn cache_controller(&self) -> &CacheController {
        &self.controller
    }

    /// Probe configuration and upstream reachability.
    pub async fn health(&self) -> HealthReport {
        HealthReport::probe(self.upstream.as_ref(), &self.settings).await
    }
}
