//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use bitbucket_domain::constants::DEFAULT_API_BASE;
use bitbucket_infra::config;
use tempfile::NamedTempFile;

fn write_config(contents: &str, extension: &str) -> std::path::PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_config_from_json_file() {
    let path = write_config(
        r#"{
            "api_base": "https://bitbucket.example.org/2.0/",
            "token_url": "https://bitbucket.example.org/site/oauth2/access_token",
            "client_id": "json-key",
            "client_secret": "json-secret",
            "timeout_secs": 10
        }"#,
        "json",
    );

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from JSON file: {:?}", result.err());

    let config = result.unwrap();
    assert_eq!(config.api_base, "https://bitbucket.example.org/2.0/");
    assert_eq!(config.client_id.as_deref(), Some("json-key"));
    assert_eq!(config.client_secret.as_deref(), Some("json-secret"));
    assert_eq!(config.timeout_secs, 10);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let path = write_config(
        r#"
client_id = "toml-key"
client_secret = "toml-secret"
user_agent = "integration/1.0"
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("Failed to load config from TOML file");
    assert_eq!(config.client_id.as_deref(), Some("toml-key"));
    assert_eq!(config.user_agent, "integration/1.0");
    assert_eq!(config.api_base, DEFAULT_API_BASE);

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_with_minimal_fields() {
    let path = write_config("{}", "json");

    let config = config::load_from_file(Some(path.clone())).expect("Empty config should use defaults");
    assert_eq!(config.api_base, DEFAULT_API_BASE);
    assert!(config.client_id.is_none());

    std::fs::remove_file(path).ok();
}

#[test]
fn test_invalid_config_is_rejected_on_load() {
    let path = write_config(r#"{"client_secret": "orphan"}"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_err(), "A secret without a client id must not load");

    std::fs::remove_file(path).ok();
}

#[test]
fn test_serialized_config_omits_secret() {
    let path = write_config(r#"{"client_id": "key", "client_secret": "secret"}"#, "json");
    let config = config::load_from_file(Some(path.clone())).expect("config");

    let serialized = serde_json::to_string(&config).expect("serialize");
    assert!(serialized.contains("\"client_id\":\"key\""));
    assert!(!serialized.contains("secret"));

    std::fs::remove_file(path).ok();
}
