//! Testing utilities and helpers
//!
//! - **[`mocks`]**: scripted [`HttpTransport`](crate::http::HttpTransport)
//!   and [`TokenEndpoint`](crate::auth::TokenEndpoint) implementations
//! - **[`time`]**: a clock tests can move forward
//!
//! Enabled in this crate's own tests and, for downstream crates, through
//! the `test-utils` feature.

pub mod mocks;
pub mod time;

pub use mocks::{MockTokenEndpoint, MockTransport};
pub use time::MockClock;
