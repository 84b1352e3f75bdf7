// Runtime configuration.
// Command-line flags with environment-variable fallbacks.

use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use tracing::info;

use crate::cache::{CacheStore, FileStore, MemoryStore};
use crate::contact::SpamGuard;
use crate::error::Result;
use crate::github::{GITHUB_API_BASE, GitHubClient, REQUEST_TIMEOUT};
use crate::http::{AppState, Throttle};
use crate::service::{DEFAULT_PER_PAGE, GitHubService, GitHubSettings};

/// Where cached entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackend {
    /// In-process map, lost on restart.
    Memory,
    /// JSON files under the cache directory.
    File,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "folio-api")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "FOLIO_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// GitHub token sent with every API request.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub account whose repositories are served.
    #[arg(long, env = "GITHUB_USERNAME")]
    pub github_username: Option<String>,

    #[arg(long, env = "FOLIO_GITHUB_API", default_value = GITHUB_API_BASE)]
    pub github_api: String,

    /// Repositories requested per page.
    #[arg(long, env = "FOLIO_PER_PAGE", default_value_t = DEFAULT_PER_PAGE)]
    pub per_page: u32,

    #[arg(long, env = "FOLIO_CACHE", value_enum, default_value_t = CacheBackend::Memory)]
    pub cache: CacheBackend,

    /// Directory for the file cache (defaults to the user cache directory).
    #[arg(long, env = "FOLIO_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// GitHub endpoint requests per client per hour (0 disables).
    #[arg(long, env = "FOLIO_GITHUB_THROTTLE", default_value_t = 30)]
    pub github_throttle: usize,

    /// Contact submissions per client per hour (0 disables).
    #[arg(long, env = "FOLIO_CONTACT_THROTTLE", default_value_t = 5)]
    pub contact_throttle: usize,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse `args` alone, ignoring environment variables.
    pub fn try_parse_args<I, T>(args: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(args)?;
        Self::from_arg_matches(&matches)
    }

    fn token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn github_settings(&self) -> GitHubSettings {
        GitHubSettings::new(self.github_username.clone(), self.token().is_some())
            .with_per_page(self.per_page)
    }

    pub fn cache_store(&self) -> Result<Arc<dyn CacheStore>> {
        let store: Arc<dyn CacheStore> = match self.cache {
            CacheBackend::Memory => Arc::new(MemoryStore::new()),
            CacheBackend::File => {
                let store = match &self.cache_dir {
                    Some(dir) => FileStore::new(dir),
                    None => FileStore::default_location()?,
                };
                info!(root = %store.root().display(), "using file cache");
                Arc::new(store)
            }
        };
        Ok(store)
    }

    pub fn github_client(&self) -> Result<GitHubClient> {
        GitHubClient::with_endpoint(
            self.token(),
            self.github_username.as_deref(),
            &self.github_api,
            REQUEST_TIMEOUT,
        )
    }

    /// Wire up every service the HTTP layer needs.
    pub fn app_state(&self) -> Result<AppState> {
        let cache = self.cache_store()?;
        let upstream = Arc::new(self.github_client()?);

        Ok(AppState {
            github: GitHubService::new(upstream, cache.clone(), self.github_settings()),
            spam: SpamGuard::new(cache),
            github_throttle: Arc::new(Throttle::per_hour(self.github_throttle)),
            contact_throttle: Arc::new(Throttle::per_hour(self.contact_throttle)),
        })
    }
}
