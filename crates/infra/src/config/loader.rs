//! Configuration loader
//!
//! Loads the client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the consumer credentials are missing there, falls back to a file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! Every loaded configuration is validated before it is returned.
//!
//! ## Environment Variables
//! - `BITBUCKET_CLIENT_ID`: OAuth consumer key (required)
//! - `BITBUCKET_CLIENT_SECRET`: OAuth consumer secret (required)
//! - `BITBUCKET_API_BASE`: API base URL, ending with `/`
//! - `BITBUCKET_TOKEN_URL`: OAuth token endpoint
//! - `BITBUCKET_AUTHORIZE_URL`: OAuth authorization endpoint
//! - `BITBUCKET_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `BITBUCKET_USER_AGENT`: User agent sent with every request
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./bitbucket.json` or `./bitbucket.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent directory
//! 4. Relative to executable location

use std::path::{Path, PathBuf};

use bitbucket_domain::{ClientConfig, ConfigError};

type Result<T> = std::result::Result<T, ConfigError>;

const FILE_NAMES: [&str; 4] = ["bitbucket.json", "bitbucket.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns [`ConfigError`] if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - The loaded configuration does not validate
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The consumer key and secret must be present; every other variable
/// overrides the corresponding default when set.
///
/// # Errors
/// Returns [`ConfigError`] if required variables are missing or a value is
/// invalid.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config =
        ClientConfig::with_credentials(env_var("BITBUCKET_CLIENT_ID")?, env_var("BITBUCKET_CLIENT_SECRET")?);

    if let Some(api_base) = env_opt("BITBUCKET_API_BASE") {
        config.api_base = api_base;
    }
    if let Some(token_url) = env_opt("BITBUCKET_TOKEN_URL") {
        config.token_url = token_url;
    }
    if let Some(authorize_url) = env_opt("BITBUCKET_AUTHORIZE_URL") {
        config.authorize_url = authorize_url;
    }
    if let Some(timeout) = env_opt("BITBUCKET_TIMEOUT_SECS") {
        config.timeout_secs = timeout
            .parse::<u64>()
            .map_err(|e| ConfigError(format!("Invalid timeout: {e}")))?;
    }
    if let Some(user_agent) = env_opt("BITBUCKET_USER_AGENT") {
        config.user_agent = user_agent;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
/// Fields missing from the file keep their defaults.
///
/// # Errors
/// Returns [`ConfigError`] if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - The configuration does not validate
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ConfigError("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| ConfigError(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| ConfigError(format!("Invalid TOML format: {e}"))),
        "json" => {
            serde_json::from_str(contents).map_err(|e| ConfigError(format!("Invalid JSON format: {e}")))
        }
        _ => Err(ConfigError(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, and the directory
/// of the running executable.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ConfigError(format!("Missing required environment variable: {key}")))
}

/// Optional environment variable; empty values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
