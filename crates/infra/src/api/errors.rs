//! API-specific error types
//!
//! Provides error classification for client operations with retry metadata.
//! The client itself never retries; callers decide with
//! [`ApiError::is_retryable`].

use bitbucket_common::auth::AuthError;
use bitbucket_common::http::TransportError;
use bitbucket_domain::{ConfigError, DecodeError};
use thiserror::Error;

/// Result alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Rejected credentials or grants (401, 403, token endpoint errors)
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth), bad indices - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Response bodies that are not the expected shape - non-retryable
    Decode,
    /// Configuration errors - non-retryable
    Config,
}

/// Client operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(AuthError),

    #[error("Token endpoint unreachable: {0}")]
    TokenEndpointUnreachable(TransportError),

    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    #[error("{url} returned status {status}")]
    Status { status: u16, url: String, body: String },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Malformed page at {url}: {reason}")]
    MalformedPage { url: String, reason: String },

    #[error("Index {index} out of bounds for sequence of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    /// Get the error category for this error
    pub const fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::TokenEndpointUnreachable(_) | Self::Transport(_) => ApiErrorCategory::Network,
            Self::Status { status, .. } => match *status {
                401 | 403 => ApiErrorCategory::Authentication,
                429 => ApiErrorCategory::RateLimit,
                500..=599 => ApiErrorCategory::Server,
                _ => ApiErrorCategory::Client,
            },
            Self::Decode(_) | Self::MalformedPage { .. } => ApiErrorCategory::Decode,
            Self::OutOfBounds { .. } => ApiErrorCategory::Client,
            Self::Config(_) | Self::InvalidUrl { .. } => ApiErrorCategory::Config,
        }
    }

    /// Check if repeating the same call may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }

    /// Get suggested retry delay in seconds
    pub const fn retry_delay_secs(&self) -> u64 {
        match self.category() {
            ApiErrorCategory::RateLimit => 60, // Wait for rate limit window
            ApiErrorCategory::Server => 10,
            ApiErrorCategory::Network => 5,
            ApiErrorCategory::Authentication
            | ApiErrorCategory::Client
            | ApiErrorCategory::Decode
            | ApiErrorCategory::Config => 0, // No retry
        }
    }

    /// HTTP status of a non-success response, if that is what failed.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Auth(AuthError::AuthenticationFailure { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Unreachable token endpoints stay distinguishable from rejected grants.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenEndpointUnreachable(source) => Self::TokenEndpointUnreachable(source),
            other => Self::Auth(other),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.0)
    }
}
