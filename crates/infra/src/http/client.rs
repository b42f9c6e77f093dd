use std::time::Duration;

use bitbucket_common::http::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError,
};
use bitbucket_domain::constants::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use bitbucket_domain::ClientConfig;
use reqwest::blocking::Client as ReqwestClient;
use tracing::debug;

/// Immutable settings every blocking client is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Blocking HTTP transport backed by `reqwest`.
///
/// A fresh client is built for every request and dropped when the request
/// finishes, whichever way it finishes. Only the configuration is shared.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    config: HttpClientConfig,
}

impl ReqwestTransport {
    /// Start building a new transport.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport using the timeout and user agent of a client configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
    }

    pub const fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    fn client(&self) -> Result<ReqwestClient, reqwest::Error> {
        ReqwestClient::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent.as_str())
            .no_proxy()
            .build()
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = request.method;
        let url = request.url.to_string();
        let client = self.client().map_err(|err| map_transport_error(&url, &err))?;

        let mut builder = match method {
            HttpMethod::Get => client.get(request.url.clone()),
            HttpMethod::Post => client.post(request.url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(form) = &request.form {
            builder = builder.form(form);
        }

        debug!(%method, %url, "sending HTTP request");
        let response = builder.send().map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            map_transport_error(&url, &err)
        })?;

        let status = response.status();
        debug!(%method, %url, %status, "received HTTP response");

        let body = response.text().map_err(|err| map_transport_error(&url, &err))?;
        Ok(HttpResponse::new(status.as_u16(), body))
    }
}

/// Builder for [`ReqwestTransport`].
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    pub fn build(self) -> ReqwestTransport {
        ReqwestTransport { config: self.config }
    }
}

fn map_transport_error(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout { url: url.to_string() };
    }
    if err.is_connect() {
        return TransportError::Connect { url: url.to_string(), message: err.to_string() };
    }
    TransportError::Other { url: url.to_string(), message: err.to_string() }
}
