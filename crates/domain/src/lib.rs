//! # Bitbucket Domain
//!
//! Typed resources of the Bitbucket Cloud 2.0 API and the decoder that
//! builds them from JSON.
//!
//! This crate contains:
//! - Resource families (accounts, repositories, refs, commits, issues)
//! - The tag-dispatching decoder and its error type
//! - Client configuration and endpoint constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O: everything here is a pure function of its input

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod constants;
pub mod decode;
pub mod errors;
pub mod json;
pub mod types;

// Re-export commonly used items
pub use config::ClientConfig;
pub use constants::UNKNOWN_COUNT;
pub use decode::{decode, decode_optional, decode_with, Decoder, Resource};
pub use errors::{ConfigError, DecodeError, Result};
pub use json::Links;
pub use types::*;
