//! OAuth 2.0 token endpoint client
//!
//! Posts grants as form data with the consumer credentials in an HTTP Basic
//! `Authorization` header and parses the JSON token response.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

use super::grant::Grant;
use super::traits::TokenEndpoint;
use super::types::{OAuthConfig, OAuthError, TokenResponse};
use crate::http::{HttpRequest, HttpTransport, TransportError};

/// Error type for token exchanges
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The authorization server rejected the grant.
    #[error("authentication failed (HTTP {status}): {error}")]
    AuthenticationFailure { status: u16, error: OAuthError },

    /// No response from the token endpoint.
    #[error("token endpoint unreachable: {0}")]
    TokenEndpointUnreachable(#[from] TransportError),

    /// A 2xx response that is not a token response.
    #[error("invalid token response: {0}")]
    InvalidTokenResponse(String),
}

/// Token endpoint client over any [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct OAuthClient<T> {
    config: OAuthConfig,
    transport: T,
}

impl<T: HttpTransport> OAuthClient<T> {
    #[must_use]
    pub const fn new(config: OAuthConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub const fn config(&self) -> &OAuthConfig {
        &self.config
    }

    fn basic_credentials(&self) -> Option<String> {
        let client_id = self.config.client_id.as_deref()?;
        let secret = self.config.client_secret.as_deref().unwrap_or_default();
        Some(format!("Basic {}", STANDARD.encode(format!("{client_id}:{secret}"))))
    }
}

impl<T: HttpTransport> TokenEndpoint for OAuthClient<T> {
    fn request_token(&self, grant: &Grant) -> Result<TokenResponse, AuthError> {
        let mut request = HttpRequest::post_form(self.config.token_url.clone(), grant.form_params());
        if let Some(credentials) = self.basic_credentials() {
            request.set_header("Authorization", credentials);
        }

        debug!(grant_type = grant.grant_type(), url = %self.config.token_url, "requesting token");
        let response = self.transport.execute(request)?;

        if !response.is_success() {
            let error = response.json::<OAuthError>().unwrap_or_else(|_| OAuthError {
                error: format!("http_{}", response.status),
                error_description: Some(response.body.chars().take(200).collect()),
            });
            warn!(
                grant_type = grant.grant_type(),
                status = response.status,
                error = %error.error,
                "token endpoint rejected grant"
            );
            return Err(AuthError::AuthenticationFailure { status: response.status, error });
        }

        response.json::<TokenResponse>().map_err(|e| AuthError::InvalidTokenResponse(e.to_string()))
    }
}
