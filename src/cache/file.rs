// Filesystem cache store.
// One JSON file per key, wrapped with timestamps and written atomically.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{FolioError, Result};

use super::paths::{cache_dir, entry_path};
use super::store::CacheStore;

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData {
    /// The cached payload.
    pub data: String,
    /// When the data was cached.
    pub cached_at: DateTime<Utc>,
    /// When the data stops being served.
    pub expires_at: DateTime<Utc>,
}

impl CachedData {
    pub fn new(data: String, ttl: Duration) -> Self {
        let cached_at = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        Self {
            data,
            cached_at,
            expires_at: cached_at.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Cache store persisted under a directory, surviving restarts.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the per-user cache directory.
    pub fn default_location() -> Result<Self> {
        cache_dir()
            .map(Self::new)
            .ok_or_else(|| FolioError::Cache("no cache directory for this platform".to_string()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, path: &Path) -> Result<Option<CachedData>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let cached: CachedData = serde_json::from_str(&contents)?;
        Ok(Some(cached))
    }
}

impl CacheStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = entry_path(&self.root, key);
        match self.read(&path)? {
            Some(cached) if cached.is_expired() => {
                self.delete(key)?;
                Ok(None)
            }
            Some(cached) => Ok(Some(cached.data)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        let path = entry_path(&self.root, key);
        let cached = CachedData::new(value, ttl);
        let json = serde_json::to_string_pretty(&cached)?;

        // Write atomically via a temp file unique to this writer
        let mut file = NamedTempFile::new_in(&self.root)?;
        file.write_all(json.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&path).map_err(|e| e.error)?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(entry_path(&self.root, key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
