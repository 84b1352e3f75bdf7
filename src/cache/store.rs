// Cache store abstraction.
// Key/value storage with per-key expiry, plus typed JSON helpers on top of it.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::error::Result;

/// TTL for the cached repository list: 1 hour.
pub const REPOS_TTL: Duration = Duration::from_secs(60 * 60);

/// TTL for the cached statistics snapshot: 2 hours.
pub const STATS_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Key/value store with per-key expiry.
///
/// Values are opaque serialized payloads. Each call is atomic for its key;
/// nothing is guaranteed across keys.
pub trait CacheStore: Send + Sync {
    /// Get a live value, or `None` if the key is absent or expired.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value that expires after `ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Read and decode a cached value.
///
/// Store failures and undecodable payloads are logged and reported as a miss,
/// so callers fall through to a rebuild.
pub fn read_cached<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "cache read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "discarding undecodable cache entry");
            None
        }
    }
}

/// Encode and store a value.
pub fn write_cached<T: Serialize + ?Sized>(
    store: &dyn CacheStore,
    key: &str,
    data: &T,
    ttl: Duration,
) -> Result<()> {
    let json = serde_json::to_string(data)?;
    store.set(key, json, ttl)
}

/// Cache key for an account's repository list.
pub fn repos_key(account: &str) -> String {
    format!("github_repos_{}", account)
}

/// Cache key for an account's statistics snapshot.
pub fn stats_key(account: &str) -> String {
    format!("github_stats_{}", account)
}
