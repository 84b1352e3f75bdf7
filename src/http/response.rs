// Response envelopes shared by the HTTP handlers.

use std::time::Duration;

use axum::Json;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use crate::error::FolioError;

/// A failed operation, tagged with what was being done.
#[derive(Debug)]
pub struct ApiError {
    pub error: FolioError,
    pub context: &'static str,
}

impl ApiError {
    pub fn new(error: FolioError, context: &'static str) -> Self {
        Self { error, context }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.error.kind();
        let status =
            StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        error!(context = self.context, error = %self.error, "request failed");

        let body = Json(json!({
            "error": kind.label(),
            "message": self.error.to_string(),
            "context": self.context,
            "timestamp": Utc::now(),
            "status_code": status.as_u16(),
        }));

        let mut resp = (status, body).into_response();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            resp.headers_mut()
                .insert("retry-after", HeaderValue::from_static("60"));
        }
        resp
    }
}

/// 429 response for a throttled client.
pub fn throttled(retry_after: Duration) -> Response {
    let status = StatusCode::TOO_MANY_REQUESTS;
    let body = Json(json!({
        "error": "Rate Limited",
        "message": "Request was throttled. Please try again later.",
        "timestamp": Utc::now(),
        "status_code": status.as_u16(),
    }));

    let mut resp = (status, body).into_response();
    let seconds = retry_after.as_secs().max(1).to_string();
    if let Ok(value) = HeaderValue::from_str(&seconds) {
        resp.headers_mut().insert("retry-after", value);
    }
    resp
}
