//! Error types for Mixpanel operations.

use std::time::Duration;

use thiserror::Error;

/// Error raised while resolving credentials, validating input, or talking to
/// the Mixpanel API.
#[derive(Error, Debug)]
pub enum MixpanelError {
    /// Mandatory tenant credentials were absent from the inbound request.
    #[error("Missing Mixpanel credentials: {}", missing.join(", "))]
    MissingCredentials {
        /// Header names that were missing or blank.
        missing: Vec<&'static str>,
    },

    /// An ingestion-class operation was invoked without a project token.
    #[error("Project token required for {operation}: set the {header} header")]
    MissingToken {
        /// Operation that needed the token.
        operation: &'static str,
        /// Header the token is read from.
        header: &'static str,
    },

    /// Mixpanel rejected the credentials (401/403).
    #[error("Authentication failed ({status}): {message}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Mixpanel rate limited the request (429).
    #[error("Rate limited by Mixpanel, retry after {retry_after_secs} seconds: {message}")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
        /// Response body text.
        message: String,
    },

    /// Any other unsuccessful response.
    #[error("Mixpanel API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Tool arguments failed schema or semantic validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A base URL could not be parsed or extended.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl MixpanelError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Retry delay suggested by Mixpanel, if this is a rate-limit error.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                retry_after_secs, ..
            } => Some(Duration::from_secs(*retry_after_secs)),
            _ => None,
        }
    }

    /// Short machine-readable classification used in logs and envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredentials { .. } => "missing_credentials",
            Self::MissingToken { .. } => "missing_token",
            Self::Authentication { .. } => "authentication",
            Self::RateLimited { .. } => "rate_limited",
            Self::Api { .. } => "api_error",
            Self::InvalidInput(_) => "invalid_input",
            Self::Http(_) => "http",
            Self::Json(_) => "json",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

/// Result type alias for Mixpanel operations.
pub type Result<T> = std::result::Result<T, MixpanelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_names_every_field() {
        let err = MixpanelError::MissingCredentials {
            missing: vec!["x-mixpanel-username", "x-mixpanel-project-id"],
        };
        assert_eq!(
            err.to_string(),
            "Missing Mixpanel credentials: x-mixpanel-username, x-mixpanel-project-id"
        );
    }

    #[test]
    fn test_missing_token_message() {
        let err = MixpanelError::MissingToken {
            operation: "track_event",
            header: "x-mixpanel-project-token",
        };
        let msg = err.to_string();
        assert!(msg.contains("token required"));
        assert!(msg.contains("x-mixpanel-project-token"));
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        let limited = MixpanelError::RateLimited {
            retry_after_secs: 12,
            message: String::new(),
        };
        assert_eq!(limited.retry_after(), Some(Duration::from_secs(12)));
        assert_eq!(limited.kind(), "rate_limited");

        let api = MixpanelError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(api.retry_after(), None);
    }
}
