//! Bearer token authenticator with single-flight refresh
//!
//! Owns the credential state of one client session:
//! - grant exchanges (authorization code, password, refresh token)
//! - bearer header injection for requests under the API base
//! - transparent refresh shortly before expiry
//! - logout
//!
//! The check-expiry / refresh / read-token sequence runs under one mutex, so
//! concurrent callers that find an expiring token wait for the first
//! caller's refresh and reuse its result instead of refreshing again.

use std::sync::Arc;

use chrono::Duration;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::client::AuthError;
use super::grant::Grant;
use super::traits::{TokenEndpoint, TokenRefreshListener};
use super::types::{CredentialState, EXPIRY_MARGIN_SECS};
use crate::http::HttpRequest;
use crate::time::{Clock, SystemClock};

/// Attaches and refreshes OAuth 2.0 bearer tokens.
///
/// One instance is shared (behind `&` or `Arc`) by every request of a
/// client; it is `Send + Sync` whenever the endpoint and clock are.
pub struct Authenticator<E, C = SystemClock> {
    endpoint: E,
    clock: C,
    api_base: String,
    expiry_margin: Duration,
    state: Mutex<CredentialState>,
    listeners: RwLock<Vec<Arc<dyn TokenRefreshListener>>>,
}

impl<E: TokenEndpoint> Authenticator<E> {
    /// Authenticator for requests whose URL starts with `api_base`.
    #[must_use]
    pub fn new(endpoint: E, api_base: impl Into<String>) -> Self {
        Self::with_clock(endpoint, api_base, SystemClock)
    }
}

impl<E: TokenEndpoint, C: Clock> Authenticator<E, C> {
    #[must_use]
    pub fn with_clock(endpoint: E, api_base: impl Into<String>, clock: C) -> Self {
        Self {
            endpoint,
            clock,
            api_base: api_base.into(),
            expiry_margin: Duration::seconds(EXPIRY_MARGIN_SECS),
            state: Mutex::new(CredentialState::default()),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Refresh this long before the absolute expiry (default 60 seconds).
    #[must_use]
    pub fn expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin.max(Duration::zero());
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub const fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Exchange `grant` for new tokens and replace the credential state.
    ///
    /// On failure the previous state is kept untouched.
    ///
    /// # Errors
    /// Propagates the [`AuthError`] of the exchange.
    pub fn request_token(&self, grant: &Grant) -> Result<CredentialState, AuthError> {
        let updated = {
            let mut state = self.state.lock();
            self.exchange_locked(&mut state, grant)?
        };

        if matches!(grant, Grant::RefreshToken { .. }) {
            self.notify_refreshed(&updated);
        }
        info!(grant_type = grant.grant_type(), "obtained access token");
        Ok(updated)
    }

    /// Add `Authorization: Bearer <token>` to `request` when it targets the
    /// API and a token is held, refreshing first if the token is expiring.
    ///
    /// Requests proceed unauthenticated without a token, and with the stale
    /// token when it expired and no refresh token is held.
    ///
    /// # Errors
    /// Propagates the [`AuthError`] of a failed refresh.
    pub fn authenticate_request(&self, request: &mut HttpRequest) -> Result<(), AuthError> {
        if !request.url.as_str().starts_with(&self.api_base) {
            return Ok(());
        }

        if let Some(token) = self.access_token()? {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        Ok(())
    }

    /// Current access token, refreshed first when it is about to expire.
    ///
    /// # Errors
    /// Propagates the [`AuthError`] of a failed refresh.
    pub fn access_token(&self) -> Result<Option<String>, AuthError> {
        let mut refreshed = None;
        let token = {
            let mut state = self.state.lock();
            if state.needs_refresh(self.clock.now(), self.expiry_margin) {
                match state.refresh_token.clone() {
                    Some(refresh_token) => {
                        debug!("access token expiring, refreshing");
                        let grant = Grant::RefreshToken { refresh_token };
                        refreshed = Some(self.exchange_locked(&mut state, &grant)?);
                    }
                    None => debug!("access token expired and no refresh token held"),
                }
            }
            state.access_token.clone()
        };

        if let Some(updated) = refreshed {
            info!("refreshed access token");
            self.notify_refreshed(&updated);
        }
        Ok(token)
    }

    /// Clear every token. Does not contact the server.
    pub fn logout(&self) {
        *self.state.lock() = CredentialState::default();
        info!("tokens cleared (logged out)");
    }

    /// Whether a token is held and not past its absolute expiry.
    pub fn is_authenticated(&self) -> bool {
        self.state.lock().is_authenticated(self.clock.now())
    }

    /// Snapshot of the credential state, e.g. for persistence.
    pub fn credentials(&self) -> CredentialState {
        self.state.lock().clone()
    }

    /// Replace the credential state with previously persisted tokens.
    pub fn restore_tokens(&self, credentials: CredentialState) {
        *self.state.lock() = credentials;
        debug!("credential state restored");
    }

    pub fn add_refresh_listener(&self, listener: Arc<dyn TokenRefreshListener>) {
        self.listeners.write().push(listener);
    }

    /// Remove a listener previously added (compared by pointer).
    pub fn remove_refresh_listener(&self, listener: &Arc<dyn TokenRefreshListener>) {
        self.listeners.write().retain(|existing| !Arc::ptr_eq(existing, listener));
    }

    fn exchange_locked(
        &self,
        state: &mut CredentialState,
        grant: &Grant,
    ) -> Result<CredentialState, AuthError> {
        let requested_at = self.clock.now();
        let response = self.endpoint.request_token(grant).map_err(|err| {
            warn!(grant_type = grant.grant_type(), error = %err, "token exchange failed");
            err
        })?;

        let mut updated = CredentialState::from_response(response, requested_at);
        // A refresh response may omit the refresh token; the old one stays valid.
        if let (None, Grant::RefreshToken { refresh_token }) = (&updated.refresh_token, grant) {
            updated.refresh_token = Some(refresh_token.clone());
        }
        *state = updated.clone();
        Ok(updated)
    }

    fn notify_refreshed(&self, credentials: &CredentialState) {
        let listeners = self.listeners.read().clone();
        for listener in listeners {
            listener.token_refreshed(credentials);
        }
    }
}
