// Repository fetcher.
// Paginates the account's public repositories, drops forks, sorts and caches.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{CacheStore, read_cached, repos_key, write_cached};
use crate::error::Result;
use crate::github::endpoints::get_user_repos;
use crate::github::{Repository, Upstream};

use super::GitHubSettings;

/// Most stars first; ties go to the most recently updated.
pub fn sort_repositories(repos: &mut [Repository]) {
    repos.sort_by(|a, b| {
        b.stargazers_count
            .cmp(&a.stargazers_count)
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

/// Optionally keep only featured repositories, then truncate to `limit`.
pub fn select_repositories(
    repos: Vec<Repository>,
    featured_only: bool,
    limit: usize,
) -> Vec<Repository> {
    repos
        .into_iter()
        .filter(|repo| !featured_only || repo.is_featured())
        .take(limit)
        .collect()
}

#[derive(Clone)]
pub struct RepositoryFetcher {
    upstream: Arc<dyn Upstream>,
    cache: Arc<dyn CacheStore>,
    settings: Arc<GitHubSettings>,
}

impl RepositoryFetcher {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        cache: Arc<dyn CacheStore>,
        settings: Arc<GitHubSettings>,
    ) -> Self {
        Self {
            upstream,
            cache,
            settings,
        }
    }

    /// The account's non-fork repositories, served from cache when fresh.
    ///
    /// On a miss every page is fetched before anything is cached, so a failure
    /// part-way leaves any previous entry untouched.
    pub async fn list_repositories(&self) -> Result<Vec<Repository>> {
        let account = self.settings.account()?;
        let key = repos_key(account);

        if let Some(repos) = read_cached::<Vec<Repository>>(self.cache.as_ref(), &key) {
            info!(account, count = repos.len(), "returning cached repository data");
            return Ok(repos);
        }

        let repos = self.fetch_all(account).await.map_err(|e| {
            error!(account, error = %e, "error fetching repositories");
            e.context("Failed to fetch repositories")
        })?;

        if let Err(e) = write_cached(self.cache.as_ref(), &key, &repos, self.settings.repos_ttl) {
            warn!(key = %key, error = %e, "failed to cache repositories");
        }
        info!(account, count = repos.len(), "fetched and cached repositories");

        Ok(repos)
    }

    async fn fetch_all(&self, account: &str) -> Result<Vec<Repository>> {
        let per_page = self.settings.per_page;
        let mut repos = Vec::new();

        for page in 1..=self.settings.max_pages {
            let items = get_user_repos(self.upstream.as_ref(), account, page, per_page).await?;
            let received = items.len();
            debug!(account, page, received, "fetched repository page");

            repos.extend(
                items
                    .into_iter()
                    .filter_map(|raw| Repository::from_raw(raw, account)),
            );

            if received < per_page as usize {
                break;
            }
        }

        sort_repositories(&mut repos);
        Ok(repos)
    }
}
