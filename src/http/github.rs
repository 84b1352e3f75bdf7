// GitHub endpoints.
// Thin handlers over the cached repository, statistics and refresh services.

use axum::Json;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FolioError;
use crate::github::{Repository, UserStats};
use crate::service::repos::select_repositories;
use crate::service::{HealthReport, RefreshSummary};

use super::AppState;
use super::response::ApiError;

/// Repositories returned when no limit is given.
pub const DEFAULT_LIMIT: usize = 20;

/// Upper bound on the `limit` query parameter.
pub const MAX_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ReposQuery {
    pub limit: Option<String>,
    pub featured: Option<String>,
}

impl ReposQuery {
    fn limit(&self) -> Result<usize, FolioError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_LIMIT),
            Some(raw) => raw
                .parse::<usize>()
                .map(|limit| limit.min(MAX_LIMIT))
                .map_err(|_| FolioError::InvalidRequest(format!("invalid limit '{}'", raw))),
        }
    }

    fn featured_only(&self) -> bool {
        self.featured
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Serialize)]
pub struct ReposResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Repository>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: UserStats,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: RefreshSummary,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub service: &'static str,
    pub status: &'static str,
    pub configuration: HealthReport,
    pub timestamp: DateTime<Utc>,
}

pub async fn list_repositories(
    State(state): State<AppState>,
    Query(query): Query<ReposQuery>,
) -> Result<Json<ReposResponse>, ApiError> {
    const CONTEXT: &str = "fetching repositories";

    let limit = query.limit().map_err(|e| ApiError::new(e, CONTEXT))?;
    let repos = state
        .github
        .repositories()
        .list_repositories()
        .await
        .map_err(|e| ApiError::new(e, CONTEXT))?;

    let data = select_repositories(repos, query.featured_only(), limit);
    Ok(Json(ReposResponse {
        success: true,
        count: data.len(),
        data,
        last_updated: Utc::now(),
    }))
}

pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let data = state
        .github
        .statistics()
        .get_user_statistics()
        .await
        .map_err(|e| ApiError::new(e, "fetching GitHub statistics"))?;

    Ok(Json(StatsResponse {
        success: true,
        data,
    }))
}

pub async fn refresh_cache(
    State(state): State<AppState>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let data = state
        .github
        .cache_controller()
        .force_refresh()
        .await
        .map_err(|e| ApiError::new(e, "refreshing cache"))?;

    info!(
        repositories = data.repositories_count,
        total_stars = data.total_stars,
        "cache refreshed"
    );
    Ok(Json(RefreshResponse {
        success: true,
        message: "Cache refreshed successfully",
        data,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let configuration = state.github.health().await;

    Json(HealthResponse {
        success: true,
        service: "GitHub API Integration",
        status: configuration.status(),
        configuration,
        timestamp: Utc::now(),
    })
}
