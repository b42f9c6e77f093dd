//! Blocking HTTP transport seam
//!
//! The authenticator and the API layer describe requests with these plain
//! types and hand them to an [`HttpTransport`]. Production code plugs in a
//! reqwest-backed transport; tests plug in
//! [`MockTransport`](crate::testing::MockTransport).

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Request methods used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
        })
    }
}

/// An outgoing request.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    /// `application/x-www-form-urlencoded` body, if any.
    pub form: Option<Vec<(String, String)>>,
}

impl HttpRequest {
    /// `GET url` accepting JSON.
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            form: None,
        }
    }

    /// `POST url` with a form-encoded body, accepting JSON.
    pub fn post_form(url: Url, form: Vec<(String, String)>) -> Self {
        Self { method: HttpMethod::Post, form: Some(form), ..Self::get(url) }
    }

    /// Set `name` to `value`, replacing any previous value.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }

    /// First value of header `name` (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Value of form field `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form.as_ref()?.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

// Headers and form fields carry credentials, keep them out of logs.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| name.as_str()).collect();
        let form_keys: Option<Vec<&str>> =
            self.form.as_ref().map(|form| form.iter().map(|(key, _)| key.as_str()).collect());
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &header_names)
            .field("form", &form_keys)
            .finish()
    }
}

/// A fully buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    /// Returns the `serde_json` error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// The request never produced a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP request to {url} failed: {message}")]
    Other { url: String, message: String },
}

impl TransportError {
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url } | Self::Connect { url, .. } | Self::Other { url, .. } => url,
        }
    }
}

/// Executes one request synchronously on the calling thread.
///
/// Implementations acquire whatever connection resources they need for the
/// duration of the call and release them before returning, on every path.
pub trait HttpTransport: Send + Sync {
    /// # Errors
    /// Returns [`TransportError`] when no response was received. Non-2xx
    /// statuses are successful transport results.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpTransport + ?Sized> HttpTransport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}
