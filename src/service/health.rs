// GitHub integration health probe.

use serde::Serialize;
use tracing::warn;

use crate::github::endpoints::get_user;
use crate::github::{RateLimit, Upstream};

use super::GitHubSettings;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub has_token: bool,
    pub has_username: bool,
    pub service_available: bool,
    pub api_accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimit>,
}

impl HealthReport {
    /// Check configuration and issue one profile request when an account is set.
    pub async fn probe(upstream: &dyn Upstream, settings: &GitHubSettings) -> Self {
        let api_accessible = match settings.account.as_deref() {
            Some(account) => match get_user(upstream, account).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(account, error = %e, "GitHub API not reachable");
                    false
                }
            },
            None => false,
        };

        Self {
            has_token: settings.has_token,
            has_username: settings.account.is_some(),
            service_available: true,
            api_accessible,
            rate_limit: upstream.rate_limit(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.has_token && self.has_username && self.service_available && self.api_accessible
    }

    pub fn status(&self) -> &'static str {
        if self.is_healthy() { "healthy" } else { "degraded" }
    }
}
