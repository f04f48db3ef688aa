//! Error types for remote API interaction.

use std::io;

use gitlab::api::ApiError;
use gitlab::RestError;
use thiserror::Error;

/// Errors that can occur while managing remote resources.
///
/// Nothing is retried and nothing is recovered mid-iteration: a failure
/// partway through a bulk operation aborts the remaining items and leaves
/// prior successful mutations in place.
#[derive(Debug, Error)]
pub enum Error {
    /// A username did not resolve to exactly one account.
    #[error("No such user: {username}")]
    Resolution { username: String },

    /// A failure reported by the GitLab API (authentication, not-found,
    /// rate limit, server error).
    #[error("GitLab API error: {0}")]
    Api(String),

    /// Network-level failure (DNS, TLS, timeout).
    #[error("network error: {0}")]
    Transport(String),

    /// Local I/O failure while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Anything else.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl Error {
    /// Create an API error from a message.
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// An endpoint that could not be built; a programming error rather
    /// than a remote one.
    pub(crate) fn endpoint(err: impl std::fmt::Display) -> Self {
        Self::Unexpected(format!("endpoint construction failed: {err}"))
    }
}

impl From<ApiError<RestError>> for Error {
    fn from(err: ApiError<RestError>) -> Self {
        match err {
            ApiError::Client { source } => Self::Transport(source.to_string()),
            ApiError::Gitlab { msg } => Self::Api(msg),
            ApiError::GitlabService { status, .. } => {
                Self::Api(format!("service responded with {status}"))
            }
            ApiError::GitlabObject { obj } | ApiError::GitlabUnrecognized { obj } => {
                Self::Api(obj.to_string())
            }
            other => Self::Unexpected(other.to_string()),
        }
    }
}

impl From<gitlab::GitlabError> for Error {
    fn from(err: gitlab::GitlabError) -> Self {
        let msg = err.to_string();
        if msg.contains("auth") || msg.contains("401") {
            Self::Api(msg)
        } else {
            Self::Transport(msg)
        }
    }
}

/// `true` for a 404 answer; used where not-found is data rather than a
/// failure (a member lookup on a group the user is not in).
pub(crate) fn is_not_found(err: &ApiError<RestError>) -> bool {
    match err {
        ApiError::Gitlab { msg } => msg.starts_with("404"),
        ApiError::GitlabService { status, .. } => status.as_u16() == 404,
        _ => false,
    }
}

/// Extract a short error message suitable for one-line display.
///
/// Takes the first line of the error message, which keeps multi-line
/// diagnostics out of the abort message shown to the user.
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for all library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_message() {
        let err = Error::Resolution {
            username: "test.user".to_string(),
        };
        assert_eq!(err.to_string(), "No such user: test.user");
    }

    #[test]
    fn test_api_error_constructor() {
        let err = Error::api("401 Unauthorized");
        assert!(matches!(err, Error::Api(_)));
        assert_eq!(err.to_string(), "GitLab API error: 401 Unauthorized");
    }

    #[test]
    fn test_short_error_message_takes_first_line() {
        let err = Error::api("something broke\nwith a second line");
        assert_eq!(
            short_error_message(&err),
            "GitLab API error: something broke"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
