// GitHub API endpoint functions.
// Typed wrappers over `Upstream::request` for the endpoints this service reads.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FolioError, Result};

use super::client::Upstream;
use super::types::{RawRepository, UserProfile};

fn decode<T: DeserializeOwned>(endpoint: &str, body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| {
        FolioError::Upstream(format!("unexpected response from {}: {}", endpoint, e))
    })
}

/// Get a user's public profile.
pub async fn get_user(upstream: &dyn Upstream, account: &str) -> Result<UserProfile> {
    let endpoint = format!("/users/{}", account);
    let body = upstream.request(&endpoint, &[]).await?;
    decode(&endpoint, body)
}

/// Get one page of a user's public repositories, most recently updated first.
pub async fn get_user_repos(
    upstream: &dyn Upstream,
    account: &str,
    page: u32,
    per_page: u32,
) -> Result<Vec<RawRepository>> {
    let endpoint = format!("/users/{}/repos", account);
    let params = [
        ("type", "public".to_string()),
        ("sort", "updated".to_string()),
        ("direction", "desc".to_string()),
        ("per_page", per_page.to_string()),
        ("page", page.to_string()),
    ];
    let body = upstream.request(&endpoint, &params).await?;
    decode(&endpoint, body)
}
