// Spam heuristics for contact submissions.
// Per-IP counters and message digests live in the shared cache store.

use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::cache::{CacheStore, read_cached, write_cached};
use crate::error::Result;

use super::form::{ContactForm, MIN_MESSAGE_LENGTH};

/// Accepted submissions allowed per client IP within the window.
pub const MAX_SUBMISSIONS_PER_WINDOW: u32 = 3;

/// Links allowed in one message.
pub const MAX_LINKS: usize = 2;

/// Lifetime of submission counters and message digests.
pub const SPAM_WINDOW: Duration = Duration::from_secs(60 * 60);

static URL_RE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamReason {
    Honeypot,
    TooManySubmissions,
    DuplicateMessage,
    TooShort,
    TooManyLinks,
}

impl fmt::Display for SpamReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SpamReason::Honeypot => "honeypot field filled",
            SpamReason::TooManySubmissions => "too many submissions",
            SpamReason::DuplicateMessage => "duplicate message",
            SpamReason::TooShort => "message too short",
            SpamReason::TooManyLinks => "too many URLs",
        };
        f.write_str(reason)
    }
}

/// Stable content digest of a message, hex encoded.
pub fn message_digest(message: &str) -> String {
    format!("{:x}", Sha256::digest(message.as_bytes()))
}

fn submissions_key(ip: &str) -> String {
    format!("contact_submissions_{}", ip)
}

/// Surrounding whitespace is ignored so resubmitted textareas still match.
fn message_key(message: &str) -> String {
    format!("contact_message_{}", message_digest(message.trim()))
}

#[derive(Clone)]
pub struct SpamGuard {
    cache: Arc<dyn CacheStore>,
}

impl SpamGuard {
    pub fn new(cache: Arc<dyn CacheStore>) -> Self {
        Self { cache }
    }

    /// First heuristic the submission trips, if any.
    pub fn check(&self, ip: &str, form: &ContactForm) -> Option<SpamReason> {
        let reason = self.evaluate(ip, form)?;
        warn!(ip, %reason, "spam detected");
        Some(reason)
    }

    fn evaluate(&self, ip: &str, form: &ContactForm) -> Option<SpamReason> {
        if form.website.as_deref().is_some_and(|w| !w.is_empty()) {
            return Some(SpamReason::Honeypot);
        }

        let recent = read_cached::<u32>(self.cache.as_ref(), &submissions_key(ip)).unwrap_or(0);
        if recent >= MAX_SUBMISSIONS_PER_WINDOW {
            return Some(SpamReason::TooManySubmissions);
        }

        if read_cached::<bool>(self.cache.as_ref(), &message_key(&form.message)).is_some() {
            return Some(SpamReason::DuplicateMessage);
        }

        if form.message.chars().count() < MIN_MESSAGE_LENGTH {
            return Some(SpamReason::TooShort);
        }

        let links = URL_RE
            .as_ref()
            .map(|re| re.find_iter(&form.message).count())
            .unwrap_or(0);
        if links > MAX_LINKS {
            return Some(SpamReason::TooManyLinks);
        }

        None
    }

    /// Count an accepted submission and remember its message.
    pub fn record(&self, ip: &str, message: &str) -> Result<()> {
        let key = submissions_key(ip);
        let recent = read_cached::<u32>(self.cache.as_ref(), &key).unwrap_or(0);
        write_cached(self.cache.as_ref(), &key, &(recent + 1), SPAM_WINDOW)?;
        write_cached(self.cache.as_ref(), &message_key(message), &true, SPAM_WINDOW)
    }
}
