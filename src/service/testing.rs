// Test doubles for the service layer.
// A scripted, call-counting stand-in for the GitHub API.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{FolioError, Result};
use crate::github::Upstream;

#[derive(Debug, Default)]
struct Script {
    profile: Value,
    pages: Vec<Value>,
    fail_on_page: Option<u32>,
    fail_profile: bool,
}

/// Serves a fixed profile and fixed repository pages, counting every call.
#[derive(Debug, Default)]
pub struct FakeUpstream {
    script: Mutex<Script>,
    calls: AtomicUsize,
    repo_calls: AtomicUsize,
}

impl FakeUpstream {
    pub fn new(profile: Value, pages: Vec<Value>) -> Self {
        Self {
            script: Mutex::new(Script {
                profile,
                pages,
                ..Script::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_pages(pages: Vec<Value>) -> Self {
        Self::new(
            json!({"public_repos": 7, "followers": 3, "following": 1}),
            pages,
        )
    }

    pub fn set_pages(&self, pages: Vec<Value>) {
        self.script.lock().unwrap().pages = pages;
    }

    pub fn fail_on_page(&self, page: Option<u32>) {
        self.script.lock().unwrap().fail_on_page = page;
    }

    pub fn fail_profile(&self, fail: bool) {
        self.script.lock().unwrap().fail_profile = fail;
    }

    /// Total requests issued.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Repository page requests issued.
    pub fn repo_calls(&self) -> usize {
        self.repo_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script.lock().unwrap();

        if !endpoint.ends_with("/repos") {
            if script.fail_profile {
                return Err(FolioError::Upstream("HTTP 500".to_string()));
            }
            return Ok(script.profile.clone());
        }

        self.repo_calls.fetch_add(1, Ordering::SeqCst);
        let page: u32 = params
            .iter()
            .find(|(name, _)| *name == "page")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or(1);

        if script.fail_on_page == Some(page) {
            return Err(FolioError::Upstream(format!(
                "request to {} timed out after 10s",
                endpoint
            )));
        }

        Ok(script
            .pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_else(|| json!([])))
    }
}

/// Repository item in the shape GitHub returns.
pub fn repo_json(id: u64, stars: u64, language: Option<&str>, updated_at: &str, fork: bool) -> Value {
    json!({
        "id": id,
        "name": format!("repo-{}", id),
        "description": null,
        "html_url": format!("https://github.com/octocat/repo-{}", id),
        "homepage": null,
        "topics": [],
        "stargazers_count": stars,
        "forks_count": 1,
        "language": language,
        "updated_at": updated_at,
        "created_at": "2020-01-01T00:00:00Z",
        "visibility": "public",
        "fork": fork
    })
}

/// A page of `count` non-fork repositories with ids starting at `first_id`.
pub fn full_page(first_id: u64, count: u64) -> Value {
    Value::Array(
        (first_id..first_id + count)
            .map(|id| repo_json(id, id % 7, Some("Rust"), "2024-01-01T00:00:00Z", false))
            .collect(),
    )
}
