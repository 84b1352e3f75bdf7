// Cache module.
// Key/value stores with per-key expiry for GitHub data and contact-form counters.

pub mod file;
pub mod memory;
pub mod paths;
pub mod store;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{
    CacheStore, REPOS_TTL, STATS_TTL, read_cached, repos_key, stats_key, write_cached,
};
