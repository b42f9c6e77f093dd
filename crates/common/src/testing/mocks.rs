//! Mock implementations of the transport and token endpoint traits
//!
//! Provides scripted, call-recording stand-ins for tests.

// Allow missing error/panic docs for test mocks - they are designed to be simple
// and errors are clearly indicated by their return types
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use url::Url;

use crate::auth::{AuthError, Grant, TokenEndpoint, TokenResponse};
use crate::http::{HttpRequest, HttpResponse, HttpTransport, TransportError};

type Reply = Result<HttpResponse, TransportError>;

// Type aliases to reduce complexity
type ResponseMap = Arc<Mutex<HashMap<String, HttpResponse>>>;
type ReplySequenceMap = Arc<Mutex<HashMap<String, VecDeque<Reply>>>>;
type RequestLog = Arc<Mutex<Vec<HttpRequest>>>;

fn normalize(url: &str) -> String {
    Url::parse(url).map_or_else(|_| url.to_string(), |parsed| parsed.to_string())
}

/// Mock HTTP transport for testing
///
/// Replies are looked up by full URL (query included). One-shot replies
/// queued with [`add_response_sequence`](Self::add_response_sequence) or
/// [`add_failure`](Self::add_failure) are served first; afterwards the
/// persistent reply from [`add_response`](Self::add_response) is used.
/// Unknown URLs get a 404.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-utils")]
/// # {
/// use bitbucket_common::http::{HttpRequest, HttpTransport};
/// use bitbucket_common::testing::MockTransport;
/// use url::Url;
///
/// let transport = MockTransport::new();
/// transport.add_response("https://api.bitbucket.org/2.0/users/ada", 200, "{}");
///
/// let url = Url::parse("https://api.bitbucket.org/2.0/users/ada").unwrap();
/// let response = transport.execute(HttpRequest::get(url)).unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.request_count("https://api.bitbucket.org/2.0/users/ada"), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    responses: ResponseMap,
    sequences: ReplySequenceMap,
    requests: RequestLog,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Persistent reply for a URL
    pub fn add_response(&self, url: &str, status: u16, body: &str) {
        // SAFETY: Mutex poisoning is acceptable in test mocks - if a test panics,
        // the entire test fails anyway
        self.responses.lock().unwrap().insert(normalize(url), HttpResponse::new(status, body));
    }

    /// One-shot replies for a URL, served in order
    pub fn add_response_sequence(&self, url: &str, responses: Vec<(u16, &str)>) {
        let mut sequences = self.sequences.lock().unwrap();
        let queue = sequences.entry(normalize(url)).or_default();
        queue.extend(responses.into_iter().map(|(status, body)| Ok(HttpResponse::new(status, body))));
    }

    /// One-shot transport failure for a URL
    pub fn add_failure(&self, url: &str, error: TransportError) {
        self.sequences.lock().unwrap().entry(normalize(url)).or_default().push_back(Err(error));
    }

    /// Get all requests that were made
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the number of requests made to a URL
    #[must_use]
    pub fn request_count(&self, url: &str) -> usize {
        let url = normalize(url);
        self.requests.lock().unwrap().iter().filter(|req| req.url.as_str() == url).count()
    }

    /// Total number of requests made
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Get the last request made
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Clear all recorded requests
    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl HttpTransport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        let queued = self.sequences.lock().unwrap().get_mut(&key).and_then(VecDeque::pop_front);
        if let Some(reply) = queued {
            return reply;
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, r#"{"type":"error"}"#)))
    }
}

/// Mock token endpoint for testing
///
/// Serves scripted replies in order and records every grant it receives.
/// An optional latency widens race windows in concurrency tests.
#[derive(Debug, Default)]
pub struct MockTokenEndpoint {
    replies: Mutex<VecDeque<Result<TokenResponse, AuthError>>>,
    grants: Mutex<Vec<Grant>>,
    latency: Mutex<Option<Duration>>,
}

impl MockTokenEndpoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply parsed from a token response JSON body.
    pub fn push_json(&self, body: &str) {
        let response: TokenResponse = serde_json::from_str(body).unwrap();
        self.replies.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failing reply.
    pub fn push_error(&self, error: AuthError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Sleep this long inside every exchange.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = Some(latency);
    }

    /// Every grant received, in order.
    #[must_use]
    pub fn grants(&self) -> Vec<Grant> {
        self.grants.lock().unwrap().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.grants.lock().unwrap().len()
    }

    /// Number of `refresh_token` grants received.
    #[must_use]
    pub fn refresh_count(&self) -> usize {
        self.grants
            .lock()
            .unwrap()
            .iter()
            .filter(|grant| matches!(grant, Grant::RefreshToken { .. }))
            .count()
    }

    /// Refresh token sent with the latest refresh grant.
    #[must_use]
    pub fn last_refresh_token(&self) -> Option<String> {
        self.grants.lock().unwrap().iter().rev().find_map(|grant| match grant {
            Grant::RefreshToken { refresh_token } => Some(refresh_token.clone()),
            _ => None,
        })
    }
}

impl TokenEndpoint for MockTokenEndpoint {
    fn request_token(&self, grant: &Grant) -> Result<TokenResponse, AuthError> {
        self.grants.lock().unwrap().push(grant.clone());

        let latency = *self.latency.lock().unwrap();
        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(AuthError::InvalidTokenResponse("no scripted token response".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_served_before_persistent_reply() {
        let transport = MockTransport::new();
        let url = "https://api.bitbucket.org/2.0/users/ada";
        transport.add_response(url, 200, "persistent");
        transport.add_failure(url, TransportError::Timeout { url: url.into() });

        let request = || HttpRequest::get(Url::parse(url).unwrap());
        assert!(transport.execute(request()).is_err());
        assert_eq!(transport.execute(request()).unwrap().body, "persistent");
        assert_eq!(transport.request_count(url), 2);
    }

    #[test]
    fn unknown_url_is_not_found() {
        let transport = MockTransport::new();
        let response =
            transport.execute(HttpRequest::get(Url::parse("https://example.org/x").unwrap())).unwrap();
        assert!(response.is_not_found());
    }

    #[test]
    fn token_endpoint_records_grants() {
        let endpoint = MockTokenEndpoint::new();
        endpoint.push_json(r#"{"access_token":"abc"}"#);

        let grant = Grant::RefreshToken { refresh_token: "def".into() };
        assert_eq!(endpoint.request_token(&grant).unwrap().access_token, "abc");
        assert!(endpoint.request_token(&grant).is_err());
        assert_eq!(endpoint.refresh_count(), 2);
        assert_eq!(endpoint.last_refresh_token().as_deref(), Some("def"));
    }
}
