//! Error types for backend calls.

use thiserror::Error;

/// Failure of a single backend request.
///
/// Everything except [`ApiError::Application`] is a transport-level failure:
/// the backend either could not be reached or did not answer in the expected
/// shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Non-2xx response, with the backend's `detail` message when present.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Application {
        /// HTTP status code.
        status: u16,
        /// `detail` field of the error body.
        detail: Option<String>,
    },

    /// Network unreachable, connection reset, timeout.
    #[error("network error: {0}")]
    Transport(String),

    /// 2xx response whose body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Endpoint URL could not be built from the configured base address.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl ApiError {
    /// Build an application error carrying a detail message.
    #[must_use]
    pub fn application(status: u16, detail: impl Into<String>) -> Self {
        Self::Application {
            status,
            detail: Some(detail.into()),
        }
    }

    /// Whether this failure happened below the HTTP status level.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Application { .. })
    }

    /// User-facing detail, or `fallback` when the backend gave none.
    #[must_use]
    pub fn detail_or(&self, fallback: &str) -> String {
        match self {
            Self::Application { detail, .. } => {
                detail.clone().unwrap_or_else(|| fallback.to_string())
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Convenience result alias for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;
