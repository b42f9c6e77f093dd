//! Bitbucket Cloud constants
//!
//! Endpoint defaults and decoding sentinels shared by every crate in the
//! workspace.

// Endpoints
pub const DEFAULT_API_BASE: &str = "https://api.bitbucket.org/2.0/";
pub const DEFAULT_TOKEN_URL: &str = "https://bitbucket.org/site/oauth2/access_token";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://bitbucket.org/site/oauth2/authorize";

// HTTP defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("bitbucket-client/", env!("CARGO_PKG_VERSION"));

// Decoding
/// Discriminator field carried by every resource object.
pub const TYPE_FIELD: &str = "type";
/// Counter value used when the server omitted the field (distinct from zero).
pub const UNKNOWN_COUNT: i64 = -1;

// Pagination envelope
pub const PAGE_VALUES_FIELD: &str = "values";
pub const PAGE_NEXT_FIELD: &str = "next";
pub const PAGE_SIZE_FIELD: &str = "size";
