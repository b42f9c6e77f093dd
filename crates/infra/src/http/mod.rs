//! Blocking HTTP transport over `reqwest`

pub mod client;

pub use client::{HttpClientBuilder, HttpClientConfig, ReqwestTransport};
