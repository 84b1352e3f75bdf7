// Request throttling and client identification.
// Sliding-window request counts per client IP.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::AppState;
use super::response::throttled;

/// Client address attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

/// First `X-Forwarded-For` entry, when present.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// Resolve the client address and store it as a [`ClientIp`] extension.
pub async fn client_ip(mut request: Request, next: Next) -> Response {
    let ip = forwarded_for(request.headers())
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    request.extensions_mut().insert(ClientIp(ip));
    next.run(request).await
}

/// Checks between sweeps of clients with no requests left in the window.
const SWEEP_EVERY: usize = 256;

/// Allows `limit` requests per client within a rolling window.
/// A limit of zero disables throttling.
#[derive(Debug)]
pub struct Throttle {
    limit: usize,
    window: Duration,
    hits: Mutex<HashMap<String, VecDeque<Instant>>>,
    checks: AtomicUsize,
}

impl Throttle {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            hits: Mutex::new(HashMap::new()),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn per_hour(limit: usize) -> Self {
        Self::new(limit, Duration::from_secs(60 * 60))
    }

    /// Record a request. Returns how long to wait when over the limit.
    pub fn check(&self, client: &str) -> Result<(), Duration> {
        if self.limit == 0 {
            return Ok(());
        }

        let now = Instant::now();
        let Ok(mut hits) = self.hits.lock() else {
            return Ok(());
        };

        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % SWEEP_EVERY == 0 {
            hits.retain(|_, recent| {
                recent
                    .back()
                    .is_some_and(|&t| now.duration_since(t) < self.window)
            });
        }

        let recent = hits.entry(client.to_string()).or_default();

        // Remove requests outside the window.
        while recent
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            recent.pop_front();
        }

        if recent.len() >= self.limit {
            let oldest = recent.front().copied().unwrap_or(now);
            return Err(self.window.saturating_sub(now.duration_since(oldest)));
        }

        recent.push_back(now);
        Ok(())
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.hits.lock().map(|hits| hits.len()).unwrap_or(0)
    }
}

async fn enforce(throttle: &Throttle, scope: &str, request: Request, next: Next) -> Response {
    let client = request
        .extensions()
        .get::<ClientIp>()
        .map(|ip| ip.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    match throttle.check(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after) => {
            warn!(client = %client, scope, "request throttled");
            throttled(retry_after).into_response()
        }
    }
}

pub async fn limit_github(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state.github_throttle, "github", request, next).await
}

pub async fn limit_contact(State(state): State<AppState>, request: Request, next: Next) -> Response {
    enforce(&state.contact_throttle, "contact", request, next).await
}
