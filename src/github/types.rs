// GitHub API response types and the records derived from them.
// Raw payloads are deserialized leniently and normalized into owned records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Repository item as returned by `/users/{account}/repos`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub visibility: Option<String>,
    /// Items that do not say otherwise are treated as forks.
    #[serde(default = "default_fork")]
    pub fork: bool,
}

fn default_fork() -> bool {
    true
}

/// Profile returned by `/users/{account}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub public_repos: Option<u64>,
    #[serde(default)]
    pub followers: Option<u64>,
    #[serde(default)]
    pub following: Option<u64>,
}

/// Normalized, non-fork repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub html_url: String,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub visibility: String,
}

impl Repository {
    /// Topics that mark a repository as featured.
    pub const FEATURED_TOPICS: [&'static str; 3] = ["featured", "portfolio", "showcase"];

    /// Normalize a raw item. Forks yield `None`.
    pub fn from_raw(raw: RawRepository, account: &str) -> Option<Self> {
        if raw.fork {
            return None;
        }

        let description = raw
            .description
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("A project by {}", account));

        Some(Self {
            id: raw.id,
            name: raw.name,
            description,
            html_url: raw.html_url,
            homepage: raw.homepage,
            topics: raw.topics,
            stargazers_count: raw.stargazers_count,
            forks_count: raw.forks_count,
            language: raw.language,
            updated_at: raw.updated_at,
            created_at: raw.created_at,
            visibility: raw.visibility.unwrap_or_else(|| "public".to_string()),
        })
    }

    /// Starred at least once, or tagged with a featured topic.
    pub fn is_featured(&self) -> bool {
        self.stargazers_count > 0
            || self
                .topics
                .iter()
                .any(|topic| Self::FEATURED_TOPICS.contains(&topic.as_str()))
    }
}

/// Share of one language across language-tagged repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageStat {
    pub name: String,
    pub count: usize,
    pub percentage: f64,
    pub color: String,
}

/// Aggregate statistics for the tracked account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_repos: usize,
    pub total_stars: u64,
    pub total_forks: u64,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
    pub languages: Vec<LanguageStat>,
    pub last_updated: DateTime<Utc>,
}

/// Rate limit information from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RateLimit {
    pub limit: u64,
    pub remaining: u64,
    pub reset: u64,
}
