//! Traits for token exchange and refresh notification
//!
//! These traits enable dependency injection and testing by abstracting the
//! authorization server and the consumers of refreshed tokens.

use std::sync::Arc;

use super::client::AuthError;
use super::grant::Grant;
use super::types::{CredentialState, TokenResponse};

/// Trait for token endpoint operations
pub trait TokenEndpoint: Send + Sync {
    /// Exchange `grant` for tokens.
    ///
    /// # Errors
    /// [`AuthError::AuthenticationFailure`] when the server rejects the grant,
    /// [`AuthError::TokenEndpointUnreachable`] when it cannot be reached and
    /// [`AuthError::InvalidTokenResponse`] for an unparsable success body.
    fn request_token(&self, grant: &Grant) -> Result<TokenResponse, AuthError>;
}

impl<T: TokenEndpoint + ?Sized> TokenEndpoint for Arc<T> {
    fn request_token(&self, grant: &Grant) -> Result<TokenResponse, AuthError> {
        (**self).request_token(grant)
    }
}

/// Notified after every successful refresh exchange, e.g. to persist the new
/// refresh token.
pub trait TokenRefreshListener: Send + Sync {
    fn token_refreshed(&self, credentials: &CredentialState);
}

impl<F> TokenRefreshListener for F
where
    F: Fn(&CredentialState) + Send + Sync,
{
    fn token_refreshed(&self, credentials: &CredentialState) {
        self(credentials);
    }
}
