//! OAuth 2.0 authentication for the Bitbucket API
//!
//! - [`OAuthClient`]: posts grants to the token endpoint
//! - [`Authenticator`]: owns the tokens, attaches bearer headers and refreshes
//!   them single-flight
//!
//! ```
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::sync::Arc;
//!
//! use bitbucket_common::auth::{Authenticator, Grant};
//! use bitbucket_common::http::HttpRequest;
//! use bitbucket_common::testing::MockTokenEndpoint;
//! use url::Url;
//!
//! let endpoint = Arc::new(MockTokenEndpoint::new());
//! endpoint.push_json(r#"{"access_token":"abc","expires_in":3600,"refresh_token":"def"}"#);
//!
//! let auth = Authenticator::new(endpoint, "https://api.bitbucket.org/2.0/");
//! auth.request_token(&Grant::Password { username: "ada".into(), password: "pw".into() })
//!     .unwrap();
//!
//! let mut request = HttpRequest::get(Url::parse("https://api.bitbucket.org/2.0/user").unwrap());
//! auth.authenticate_request(&mut request).unwrap();
//! assert_eq!(request.header_value("Authorization"), Some("Bearer abc"));
//! # }
//! ```

pub mod authenticator;
pub mod client;
pub mod grant;
pub mod traits;
pub mod types;

pub use authenticator::Authenticator;
pub use client::{AuthError, OAuthClient};
pub use grant::Grant;
pub use traits::{TokenEndpoint, TokenRefreshListener};
pub use types::{CredentialState, OAuthConfig, OAuthError, TokenResponse, EXPIRY_MARGIN_SECS};
