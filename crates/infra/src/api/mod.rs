//! Bitbucket Cloud API client
//!
//! - [`client`]: the [`BitbucketClient`] facade (session, lookups, collections)
//! - [`pagination`]: lazy cached sequences over paginated endpoints
//! - [`errors`]: error classification with retry metadata
//!
//! # Architecture
//!
//! - Blocking calls on the caller's thread, through any
//!   [`HttpTransport`](bitbucket_common::http::HttpTransport)
//! - Bearer tokens from the shared authenticator, refreshed single-flight
//! - No retries inside the client

pub mod client;
pub mod errors;
pub mod pagination;

pub use client::BitbucketClient;
pub use errors::{ApiError, ApiErrorCategory, ApiResult};
pub use pagination::{Iter, PageFetcher, PaginatedSequence};
