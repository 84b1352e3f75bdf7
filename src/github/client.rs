// GitHub API HTTP client.
// Handles authentication, timeouts, rate limit tracking and error translation.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::{FolioError, Result};

use super::types::RateLimit;

pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Per-call timeout for upstream requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Something that answers GET requests against the GitHub REST API.
///
/// Implementations must never retry and must translate every failure into
/// [`FolioError::Upstream`].
#[async_trait]
pub trait Upstream: Send + Sync {
    /// GET `endpoint` with `params` as the query string and return the JSON body.
    async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value>;

    /// Last rate limit seen on a response, if any.
    fn rate_limit(&self) -> Option<RateLimit> {
        None
    }
}

/// GitHub API client with optional token authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    rate_limit: Mutex<Option<RateLimit>>,
}

impl GitHubClient {
    /// Create a client against api.github.com.
    pub fn new(token: Option<&str>, account: Option<&str>) -> Result<Self> {
        Self::with_endpoint(token, account, GITHUB_API_BASE, REQUEST_TIMEOUT)
    }

    /// Create a client against an arbitrary API root.
    pub fn with_endpoint(
        token: Option<&str>,
        account: Option<&str>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        let agent = format!(
            "folio-api/{} ({})",
            env!("CARGO_PKG_VERSION"),
            account.unwrap_or("unconfigured")
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&agent)
                .map_err(|e| FolioError::Configuration(format!("invalid account name: {}", e)))?,
        );

        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("token {}", token))
                    .map_err(|e| FolioError::Configuration(format!("invalid token: {}", e)))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| FolioError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            rate_limit: Mutex::new(None),
        })
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| -> Option<u64> {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
        };

        let Some(limit) = header("x-ratelimit-limit") else {
            return;
        };
        let rate_limit = RateLimit {
            limit,
            remaining: header("x-ratelimit-remaining").unwrap_or_default(),
            reset: header("x-ratelimit-reset").unwrap_or_default(),
        };

        if rate_limit.remaining == 0 {
            warn!(reset = rate_limit.reset, "GitHub rate limit exhausted");
        }

        if let Ok(mut guard) = self.rate_limit.lock() {
            *guard = Some(rate_limit);
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let message = match status {
            StatusCode::UNAUTHORIZED => {
                "authentication failed: invalid or expired token".to_string()
            }
            StatusCode::NOT_FOUND => format!("resource not found: {}", url),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
                if self.rate_limit().is_some_and(|rl| rl.remaining == 0) =>
            {
                let reset_at = self
                    .rate_limit()
                    .and_then(|rl| chrono::DateTime::from_timestamp(rl.reset as i64, 0))
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                format!("rate limit exceeded, resets at {}", reset_at)
            }
            status => format!(
                "HTTP {} for {}: {}",
                status,
                url,
                response.text().await.unwrap_or_default()
            ),
        };

        Err(FolioError::Upstream(message))
    }

    fn describe_transport_error(&self, endpoint: &str, e: &reqwest::Error) -> String {
        if e.is_timeout() {
            format!(
                "request to {} timed out after {}s",
                endpoint,
                self.timeout.as_secs()
            )
        } else {
            format!("request to {} failed: {}", endpoint, e)
        }
    }
}

#[async_trait]
impl Upstream for GitHubClient {
    async fn request(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, "GitHub request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                let message = self.describe_transport_error(endpoint, &e);
                error!(endpoint, error = %message, "GitHub API request failed");
                FolioError::Upstream(message)
            })?;

        self.update_rate_limit(&response);
        let response = self.check_response(response).await.inspect_err(|e| {
            error!(endpoint, error = %e, "GitHub API request failed");
        })?;

        response.json::<Value>().await.map_err(|e| {
            let message = self.describe_transport_error(endpoint, &e);
            error!(endpoint, error = %message, "GitHub API response unreadable");
            FolioError::Upstream(message)
        })
    }

    fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limit.lock().ok().and_then(|guard| guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> GitHubClient {
        GitHubClient::with_endpoint(
            token,
            Some("octocat"),
            &server.uri(),
            Duration::from_millis(500),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sends_headers_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("page", "2"))
            .and(header("accept", "application/vnd.github.v3+json"))
            .and(header("authorization", "token secret"))
            .and(header(
                "user-agent",
                format!("folio-api/{} (octocat)", env!("CARGO_PKG_VERSION")).as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server, Some("secret"))
            .request("/users/octocat/repos", &[("page", "2".to_string())])
            .await
            .unwrap();

        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_no_authorization_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"login": "octocat"})))
            .mount(&server)
            .await;

        let body = client(&server, None)
            .request("/users/octocat", &[])
            .await
            .unwrap();

        assert_eq!(body["login"], "octocat");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .request("/users/octocat", &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client(&server, None)
            .request("/users/octocat", &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_invalid_json_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server, None)
            .request("/users/octocat", &[])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn test_tracks_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(403)
                    .insert_header("x-ratelimit-limit", "60")
                    .insert_header("x-ratelimit-remaining", "0")
                    .insert_header("x-ratelimit-reset", "1700000000"),
            )
            .mount(&server)
            .await;

        let client = client(&server, None);
        let err = client.request("/users/octocat", &[]).await.unwrap_err();

        assert!(err.to_string().contains("rate limit exceeded"));
        assert_eq!(
            client.rate_limit(),
            Some(RateLimit {
                limit: 60,
                remaining: 0,
                reset: 1_700_000_000,
            })
        );
    }
}
