//! Client configuration

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{
    DEFAULT_API_BASE, DEFAULT_AUTHORIZE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_URL,
    DEFAULT_USER_AGENT,
};
use crate::errors::ConfigError;

/// Immutable client configuration, built once and handed to the client at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix of every resource endpoint; bearer tokens are only sent below it.
    pub api_base: String,
    pub token_url: String,
    pub authorize_url: String,
    pub client_id: Option<String>,
    #[serde(skip_serializing)]
    pub client_secret: Option<String>,
    /// Per-request timeout of the HTTP transport.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            client_id: None,
            client_secret: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default endpoints with the given OAuth consumer credentials.
    pub fn with_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: Some(client_id.into()),
            client_secret: Some(client_secret.into()),
            ..Self::default()
        }
    }

    /// Point every endpoint at `root` (a mock server in tests, a proxy in
    /// production). `root` must not end with a slash.
    pub fn with_root(mut self, root: &str) -> Self {
        let root = root.trim_end_matches('/');
        self.api_base = format!("{root}/2.0/");
        self.token_url = format!("{root}/site/oauth2/access_token");
        self.authorize_url = format!("{root}/site/oauth2/authorize");
        self
    }

    /// Check that every URL parses and the timeout is usable.
    ///
    /// # Errors
    /// Returns [`ConfigError`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_base_url()?;
        self.token_endpoint()?;
        parse_url("authorize_url", &self.authorize_url)?;
        if self.timeout_secs == 0 {
            return Err(ConfigError("timeout_secs must be greater than zero".to_string()));
        }
        if self.client_secret.is_some() && self.client_id.is_none() {
            return Err(ConfigError("client_secret is set without client_id".to_string()));
        }
        Ok(())
    }

    /// Parsed API base. A trailing slash is required so relative paths join
    /// below it instead of replacing its last segment.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the URL is invalid or lacks the slash.
    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        let url = parse_url("api_base", &self.api_base)?;
        if !url.path().ends_with('/') {
            return Err(ConfigError(format!("api_base must end with '/': {}", self.api_base)));
        }
        Ok(url)
    }

    /// Parsed token endpoint.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the URL is invalid.
    pub fn token_endpoint(&self) -> Result<Url, ConfigError> {
        parse_url("token_url", &self.token_url)
    }

    /// Browser URL starting the authorization-code flow.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if `authorize_url` is invalid or no client id
    /// is configured.
    pub fn authorization_url(&self, state: Option<&str>) -> Result<Url, ConfigError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| ConfigError("client_id is required to authorize".to_string()))?;

        let mut url = parse_url("authorize_url", &self.authorize_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", client_id).append_pair("response_type", "code");
            if let Some(state) = state {
                query.append_pair("state", state);
            }
        }
        Ok(url)
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|e| ConfigError(format!("invalid {name} '{raw}': {e}")))
}
