// Cache controller.
// Drops cached GitHub data and rebuilds it on demand.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, repos_key, stats_key};
use crate::error::Result;

use super::GitHubSettings;
use super::repos::RepositoryFetcher;
use super::stats::StatisticsAggregator;

/// Outcome of a forced refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshSummary {
    pub repositories_count: usize,
    pub total_stars: u64,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CacheController {
    repos: RepositoryFetcher,
    stats: StatisticsAggregator,
    cache: Arc<dyn CacheStore>,
    settings: Arc<GitHubSettings>,
}

impl CacheController {
    pub fn new(
        repos: RepositoryFetcher,
        stats: StatisticsAggregator,
        cache: Arc<dyn CacheStore>,
        settings: Arc<GitHubSettings>,
    ) -> Self {
        Self {
            repos,
            stats,
            cache,
            settings,
        }
    }

    /// Remove the cached repository list and statistics. Never fails.
    pub fn invalidate(&self) {
        let Some(account) = self.settings.account.as_deref() else {
            debug!("no account configured, nothing to invalidate");
            return;
        };

        for key in [repos_key(account), stats_key(account)] {
            if let Err(e) = self.cache.delete(&key) {
                warn!(key = %key, error = %e, "failed to drop cache entry");
            }
        }
        info!(account, "GitHub cache cleared");
    }

    /// Invalidate, then rebuild both entries from upstream.
    pub async fn force_refresh(&self) -> Result<RefreshSummary> {
        self.invalidate();

        let repos = self.repos.list_repositories().await?;
        let stats = self.stats.get_user_statistics().await?;

        Ok(RefreshSummary {
            repositories_count: repos.len(),
            total_stars: stats.total_stars,
            last_updated: Utc::now(),
        })
    }
}
