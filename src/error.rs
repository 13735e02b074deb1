//! Error types for support API access
//!
//! Errors are classified by recoverability:
//! - Retryable: Network issues, timeouts, rate limits, server errors
//! - NonRetryable: Bad requests, decode failures, validation
//! - RequiresUserAction: Missing or rejected session

use thiserror::Error;

/// Error returned by every API call and mutation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {status}: {body}")]
    Status {
        status: u16,
        body: String,
        /// `error` or `message` field of the response body, when present.
        server_message: Option<String>,
    },

    #[error("JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Not signed in")]
    Unauthenticated,

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session: {0}")]
    Session(#[from] crate::session::SessionError),
}

impl ApiError {
    /// Returns true if repeating the same request could succeed.
    ///
    /// Advisory only: nothing in this crate retries automatically.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(err) => err.is_timeout() || err.is_connect(),
            ApiError::Network(_) => true,
            ApiError::Status { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            _ => false,
        }
    }

    /// Returns true if the user must sign in (again) to continue.
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            ApiError::Unauthenticated | ApiError::Status { status: 401 | 403, .. }
        )
    }

    /// Message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { server_message, .. } => server_message.as_deref(),
            _ => None,
        }
    }

    /// Text to show the user: the server's message, falling back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Validation(message) => message.clone(),
            _ => self
                .server_message()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(fallback)
                .to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ApiError::Http(_) | ApiError::Network(_) => {
                "Check your connection to the support API and try again."
            }
            ApiError::Status { status: 401 | 403, .. } | ApiError::Unauthenticated => {
                "Sign in again with `supportdesk login`."
            }
            ApiError::Status { status: 404, .. } => "The record no longer exists. Refresh the list.",
            ApiError::Status { status: 429, .. } => "Wait a few minutes and try again.",
            ApiError::Status { .. } => "The support API rejected the request.",
            ApiError::Decode(_) => "The support API returned an unexpected response.",
            ApiError::Validation(_) => "Correct the highlighted input and submit again.",
            ApiError::Config(_) => "Check ~/.supportdesk/config.json.",
            ApiError::Io(_) => "Check file permissions and disk space.",
            ApiError::Session(_) => "Run `supportdesk logout` and sign in again.",
        }
    }
}

/// Serializable error representation for front ends.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorNotice {
    pub message: String,
    pub error_type: ErrorType,
    pub can_retry: bool,
    pub recovery_suggestion: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorType {
    Retryable,
    NonRetryable,
    RequiresUserAction,
}

impl From<&ApiError> for ErrorNotice {
    fn from(err: &ApiError) -> Self {
        let error_type = if err.requires_user_action() {
            ErrorType::RequiresUserAction
        } else if err.is_retryable() {
            ErrorType::Retryable
        } else {
            ErrorType::NonRetryable
        };

        ErrorNotice {
            message: err.to_string(),
            error_type,
            can_retry: err.is_retryable(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, server_message: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            body: String::new(),
            server_message: server_message.map(str::to_string),
        }
    }

    #[test]
    fn test_server_errors_are_retryable() {
        assert!(status(503, None).is_retryable());
        assert!(status(429, None).is_retryable());
        assert!(!status(400, None).is_retryable());
        assert!(!ApiError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = status(409, Some("Agent already assigned"));
        assert_eq!(err.user_message("Failed to transfer ticket"), "Agent already assigned");

        let err = status(500, None);
        assert_eq!(err.user_message("Failed to transfer ticket"), "Failed to transfer ticket");

        let err = status(500, Some("   "));
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[test]
    fn test_notice_classification() {
        let notice = ErrorNotice::from(&status(401, None));
        assert_eq!(notice.error_type, ErrorType::RequiresUserAction);
        assert!(!notice.can_retry);

        let notice = ErrorNotice::from(&ApiError::Network("reset".into()));
        assert_eq!(notice.error_type, ErrorType::Retryable);
        assert!(notice.can_retry);
    }
}
