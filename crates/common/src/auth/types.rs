//! OAuth 2.0 types and structures
//!
//! Credential state, token endpoint responses and configuration for the
//! Bitbucket authorization server.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Tokens are refreshed this long before their absolute expiry.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Token state owned by the authenticator.
///
/// Empty at construction; replaced by successful exchanges and cleared by
/// logout.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Absolute expiry of the access token; `None` means non-expiring.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CredentialState {
    /// Build the state carried by a token response received at `requested_at`.
    #[must_use]
    pub fn from_response(response: TokenResponse, requested_at: DateTime<Utc>) -> Self {
        let expires_at =
            response.expires_in.map(|secs| requested_at + Duration::seconds(secs.max(0)));

        Self {
            access_token: Some(response.access_token),
            refresh_token: response.refresh_token,
            expires_at,
        }
    }

    /// Access token present and not past its absolute expiry.
    #[must_use]
    pub fn is_authenticated(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && !self.is_expired(now)
    }

    /// Past the absolute expiry. Non-expiring tokens never expire.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Within `margin` of the expiry (or past it).
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.access_token.is_some() && self.expires_at.is_some_and(|expires_at| now + margin >= expires_at)
    }

    /// Seconds until expiry, `None` for non-expiring tokens.
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - now).num_seconds())
    }
}

// Tokens must never reach logs through `{:?}`.
impl fmt::Debug for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialState")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Successful token endpoint response (RFC 6749 §5.1).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Space separated scopes granted (Bitbucket calls this `scopes`).
    #[serde(default, alias = "scope")]
    pub scopes: Option<String>,
}

/// Token endpoint and OAuth consumer credentials.
#[derive(Clone)]
pub struct OAuthConfig {
    pub token_url: Url,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl OAuthConfig {
    #[must_use]
    pub const fn new(token_url: Url, client_id: Option<String>, client_secret: Option<String>) -> Self {
        Self { token_url, client_id, client_secret }
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// OAuth error response from authorization server
///
/// Standard OAuth 2.0 error response format (RFC 6749 §5.2).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthError {
    pub error: String,
    pub error_description: Option<String>,
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(desc) => write!(f, "{}: {}", self.error, desc),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for OAuthError {}
