// Contact form endpoints.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header::USER_AGENT};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::contact::ContactForm;
use crate::contact::form::{MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH, MAX_SUBJECT_LENGTH};
use crate::contact::spam::{MAX_LINKS, MAX_SUBMISSIONS_PER_WINDOW};

use super::AppState;
use super::throttle::ClientIp;

fn reply(status: StatusCode, mut body: Value) -> Response {
    body["success"] = json!(status.is_success());
    body["timestamp"] = json!(Utc::now());
    (status, Json(body)).into_response()
}

pub async fn submit(
    State(state): State<AppState>,
    Extension(ClientIp(ip)): Extension<ClientIp>,
    headers: HeaderMap,
    Json(form): Json<ContactForm>,
) -> Response {
    if state.spam.check(&ip, &form).is_some() {
        return reply(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"message": "Submission rejected. Please try again later."}),
        );
    }

    let submission = match form.validate() {
        Ok(submission) => submission,
        Err(errors) => {
            return reply(
                StatusCode::BAD_REQUEST,
                json!({"message": "Invalid form data.", "errors": errors}),
            );
        }
    };

    if let Err(e) = state.spam.record(&ip, &submission.message) {
        warn!(ip = %ip, error = %e, "failed to record contact submission");
    }

    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    info!(
        ip = %ip,
        user_agent,
        name = %submission.name,
        email = %submission.email,
        subject = %submission.subject,
        "contact form submitted"
    );

    reply(
        StatusCode::CREATED,
        json!({"message": "Thank you for your message! I'll get back to you soon."}),
    )
}

pub async fn contact_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "form_fields": [
                {"name": "name", "type": "text", "required": true,
                 "placeholder": "Your full name", "max_length": MAX_NAME_LENGTH},
                {"name": "email", "type": "email", "required": true,
                 "placeholder": "your.email@example.com"},
                {"name": "subject", "type": "text", "required": true,
                 "placeholder": "Subject of your message", "max_length": MAX_SUBJECT_LENGTH},
                {"name": "message", "type": "textarea", "required": true,
                 "placeholder": "Your message...", "max_length": MAX_MESSAGE_LENGTH},
            ],
            "submission_limits": {
                "max_per_hour": MAX_SUBMISSIONS_PER_WINDOW,
                "max_message_length": MAX_MESSAGE_LENGTH,
                "max_urls": MAX_LINKS,
            }
        }
    }))
}
