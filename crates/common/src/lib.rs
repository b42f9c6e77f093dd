//! Shared runtime pieces of the Bitbucket client.
//!
//! - [`http`]: the blocking transport seam every request goes through
//! - [`auth`]: OAuth 2.0 grants, token endpoint client and the bearer
//!   authenticator with single-flight refresh
//! - [`time`]: clock abstraction used for token expiry
//! - [`testing`]: mocks for the above (`test-utils` feature)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod http;
pub mod time;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
pub use auth::{AuthError, Authenticator, CredentialState, Grant, OAuthClient, OAuthConfig};
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
pub use time::{Clock, SystemClock};
