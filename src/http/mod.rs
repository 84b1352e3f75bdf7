// HTTP surface.
// Routes, shared state and middleware for the JSON API.

use std::sync::Arc;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};

use crate::contact::SpamGuard;
use crate::service::GitHubService;

pub mod contact;
pub mod github;
pub mod response;
pub mod throttle;

pub use throttle::{ClientIp, Throttle};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub github: GitHubService,
    pub spam: SpamGuard,
    pub github_throttle: Arc<Throttle>,
    pub contact_throttle: Arc<Throttle>,
}

pub fn router(state: AppState) -> Router {
    let github = Router::new()
        .route("/api/github/repos", get(github::list_repositories))
        .route("/api/github/stats", get(github::get_statistics))
        .route("/api/github/refresh", post(github::refresh_cache))
        .route_layer(from_fn_with_state(state.clone(), throttle::limit_github));

    let contact = Router::new()
        .route("/api/contact", post(contact::submit))
        .route_layer(from_fn_with_state(state.clone(), throttle::limit_contact));

    Router::new()
        .route("/api/github/health", get(github::health))
        .route("/api/contact/info", get(contact::contact_info))
        .merge(github)
        .merge(contact)
        .layer(from_fn(throttle::client_ip))
        .with_state(state)
}
