//! # Bitbucket Infrastructure
//!
//! The I/O half of the Bitbucket client.
//!
//! This crate contains:
//! - The blocking `reqwest` transport
//! - Paginated sequences and the API facade
//! - Configuration loading from environment and files
//!
//! ## Architecture
//! - Decodes with `bitbucket-domain`, authenticates with `bitbucket-common`
//! - Contains all "impure" code (network, filesystem, environment)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod api;
pub mod config;
pub mod http;

// Re-export commonly used items
pub use api::{ApiError, ApiErrorCategory, ApiResult, BitbucketClient, PaginatedSequence};
pub use http::ReqwestTransport;

/// Client over the default `reqwest` transport.
///
/// # Errors
/// Returns [`ApiError::Config`] if `config` does not validate.
pub fn connect(config: bitbucket_domain::ClientConfig) -> ApiResult<BitbucketClient<ReqwestTransport>> {
    let transport = ReqwestTransport::from_config(&config);
    BitbucketClient::new(config, transport)
}
