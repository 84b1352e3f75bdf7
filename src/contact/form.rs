// Contact form payload and field validation.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_SUBJECT_LENGTH: usize = 200;
pub const MIN_MESSAGE_LENGTH: usize = 10;
pub const MAX_MESSAGE_LENGTH: usize = 5000;

const TEMPORARY_MAIL_DOMAINS: [&str; 4] = [
    "10minutemail.com",
    "tempmail.org",
    "guerrillamail.com",
    "mailinator.com",
];

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"));

static MARKUP_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"[<>]|script|javascript|php|sql"));

static SUSPICIOUS_MESSAGE_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(
        r"<script|javascript:|php|sql\s+(select|insert|update|delete|drop|create)|https?://\S+\.(exe|zip|rar)",
    )
});

fn pattern_matches(re: &LazyLock<Result<Regex, regex::Error>>, text: &str) -> bool {
    re.as_ref().is_ok_and(|re| re.is_match(text))
}

/// Incoming contact form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
    /// Hidden honeypot field; humans leave it empty.
    #[serde(default)]
    pub website: Option<String>,
}

/// A form that passed validation, trimmed and normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Validation messages keyed by field name.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

impl ContactForm {
    pub fn validate(&self) -> Result<ContactSubmission, FieldErrors> {
        let mut errors = FieldErrors::new();
        let mut fail = |field: &'static str, message: &str| {
            errors.entry(field).or_default().push(message.to_string());
        };

        let name = self.name.trim();
        if name.chars().count() < 2 {
            fail("name", "Name must be at least 2 characters long.");
        } else if name.chars().count() > MAX_NAME_LENGTH {
            fail("name", "Name is too long.");
        } else if pattern_matches(&MARKUP_RE, &name.to_lowercase()) {
            fail("name", "Invalid characters in name.");
        }

        let email = self.email.trim().to_lowercase();
        if !pattern_matches(&EMAIL_RE, &email) {
            fail("email", "Please enter a valid email address.");
        } else if email
            .rsplit('@')
            .next()
            .is_some_and(|domain| TEMPORARY_MAIL_DOMAINS.contains(&domain))
        {
            fail("email", "Temporary email addresses are not allowed.");
        }

        let subject = self.subject.trim();
        if subject.chars().count() < 3 {
            fail("subject", "Subject must be at least 3 characters long.");
        } else if subject.chars().count() > MAX_SUBJECT_LENGTH {
            fail("subject", "Subject is too long.");
        } else if pattern_matches(&MARKUP_RE, &subject.to_lowercase()) {
            fail("subject", "Invalid characters in subject.");
        }

        let message = self.message.trim();
        let length = message.chars().count();
        if length < MIN_MESSAGE_LENGTH {
            fail("message", "Message must be at least 10 characters long.");
        } else if length > MAX_MESSAGE_LENGTH {
            fail(
                "message",
                "Message is too long. Maximum 5000 characters allowed.",
            );
        } else if pattern_matches(&SUSPICIOUS_MESSAGE_RE, &message.to_lowercase()) {
            fail("message", "Message contains suspicious content.");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ContactSubmission {
            name: name.to_string(),
            email,
            subject: subject.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ContactForm {
        ContactForm {
            name: "  Ada Lovelace ".to_string(),
            email: "Ada@Example.com".to_string(),
            subject: "Analytical engine".to_string(),
            message: "I would like to talk about your engine.".to_string(),
            website: None,
        }
    }

    #[test]
    fn test_valid_form_is_normalized() {
        let submission = form().validate().unwrap();
        assert_eq!(submission.name, "Ada Lovelace");
        assert_eq!(submission.email, "ada@example.com");
    }

    #[test]
    fn test_collects_errors_per_field() {
        let bad = ContactForm {
            name: "A".to_string(),
            email: "nope".to_string(),
            subject: "<b>hi</b>".to_string(),
            message: "short".to_string(),
            website: None,
        };

        let errors = bad.validate().unwrap_err();

        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec!["email", "message", "name", "subject"]
        );
    }

    #[test]
    fn test_rejects_temporary_mail_and_scripts() {
        let mut bad = form();
        bad.email = "bot@mailinator.com".to_string();
        bad.message = "hello <script>alert(1)</script>".to_string();

        let errors = bad.validate().unwrap_err();

        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("message"));
        assert!(!errors.contains_key("name"));
    }
}
