// Error types for folio-api.
// Classifies failures into configuration, upstream and unexpected categories.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("GitHub API error: {0}")]
    Upstream(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Caller-visible error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing deployment configuration; retrying will not help.
    Configuration,
    /// GitHub failed, timed out or answered with an error; retryable.
    Upstream,
    Unexpected,
}

impl ErrorKind {
    /// Category string carried in error responses.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "Configuration Error",
            ErrorKind::Upstream => "GitHub API Error",
            ErrorKind::Unexpected => "Internal Error",
        }
    }

    /// HTTP status code for this category.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Upstream => 503,
            ErrorKind::Configuration | ErrorKind::Unexpected => 500,
        }
    }
}

impl FolioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FolioError::Configuration(_) => ErrorKind::Configuration,
            FolioError::Upstream(_) => ErrorKind::Upstream,
            _ => ErrorKind::Unexpected,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Prefix the message with the operation that was in progress.
    /// The category is preserved.
    pub fn context(self, operation: &str) -> Self {
        match self {
            FolioError::Configuration(msg) => {
                FolioError::Configuration(format!("{}: {}", operation, msg))
            }
            FolioError::Upstream(msg) => FolioError::Upstream(format!("{}: {}", operation, msg)),
            FolioError::Cache(msg) => FolioError::Cache(format!("{}: {}", operation, msg)),
            FolioError::InvalidRequest(msg) => {
                FolioError::InvalidRequest(format!("{}: {}", operation, msg))
            }
            FolioError::Json(e) => FolioError::Other(format!("{}: JSON parsing error: {}", operation, e)),
            FolioError::Io(e) => FolioError::Other(format!("{}: IO error: {}", operation, e)),
            FolioError::Other(msg) => FolioError::Other(format!("{}: {}", operation, msg)),
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_maps_to_503() {
        let err = FolioError::Upstream("timed out".to_string());
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(err.status_code(), 503);
        assert_eq!(err.kind().label(), "GitHub API Error");
    }

    #[test]
    fn test_everything_else_maps_to_500() {
        assert_eq!(FolioError::Configuration("x".into()).status_code(), 500);
        assert_eq!(FolioError::Cache("x".into()).status_code(), 500);
        assert_eq!(FolioError::InvalidRequest("x".into()).status_code(), 500);
        assert_eq!(FolioError::Other("x".into()).status_code(), 500);

        let io = FolioError::from(std::io::Error::other("disk"));
        assert_eq!(io.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn test_context_keeps_category() {
        let err = FolioError::Upstream("HTTP 502".to_string()).context("Failed to fetch repositories");
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert_eq!(
            err.to_string(),
            "GitHub API error: Failed to fetch repositories: HTTP 502"
        );

        let err = FolioError::Configuration("GitHub username not configured".to_string())
            .context("Failed to fetch user statistics");
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
