//! Error types for resource decoding and configuration

use serde_json::Value;
use thiserror::Error;

/// Failure to turn a JSON value into a typed resource.
///
/// Both variants are fail-fast: a resource is never built from JSON whose
/// tag or field shapes disagree with the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The `type` discriminator is missing or not in the accepted set.
    #[error(
        "type mismatch at {path}: expected one of [{}], found {}",
        .expected.join(", "),
        .actual.as_deref().unwrap_or("missing")
    )]
    TypeMismatch {
        /// JSON path of the offending object (`$` is the root).
        path: String,
        /// Tags the decoder was configured to accept.
        expected: Vec<&'static str>,
        /// Tag found in the document, `None` when absent.
        actual: Option<String>,
    },

    /// A field is present but has the wrong JSON shape.
    #[error("malformed field {path}: expected {expected}, found {found}")]
    MalformedField {
        /// JSON path of the field.
        path: String,
        /// Human readable description of the accepted shape.
        expected: &'static str,
        /// JSON kind (or offending text) actually found.
        found: String,
    },
}

impl DecodeError {
    /// Build a [`DecodeError::MalformedField`] for `field` of the current object.
    pub fn malformed(field: &str, expected: &'static str, found: &Value) -> Self {
        Self::MalformedField {
            path: format!("$.{field}"),
            expected,
            found: json_kind(found).to_string(),
        }
    }

    /// Re-root the error path under `parent`, used when an embedded resource
    /// fails to decode.
    #[must_use]
    pub fn within(self, parent: &str) -> Self {
        match self {
            Self::TypeMismatch { path, expected, actual } => {
                Self::TypeMismatch { path: nest(parent, &path), expected, actual }
            }
            Self::MalformedField { path, expected, found } => {
                Self::MalformedField { path: nest(parent, &path), expected, found }
            }
        }
    }

    /// JSON path the error refers to.
    pub fn path(&self) -> &str {
        match self {
            Self::TypeMismatch { path, .. } | Self::MalformedField { path, .. } => path,
        }
    }
}

fn nest(parent: &str, path: &str) -> String {
    let rest = path.strip_prefix('$').unwrap_or(path);
    format!("$.{parent}{rest}")
}

/// Name of the JSON kind of `value`, as used in error messages.
pub const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Invalid client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Configuration error: {0}")]
pub struct ConfigError(pub String);

/// Result type alias for decoding operations
pub type Result<T, E = DecodeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn within_prefixes_nested_paths() {
        let err = DecodeError::malformed("created_on", "ISO-8601 date-time", &json!(5));
        assert_eq!(err.path(), "$.created_on");

        let err = err.within("owner").within("repository");
        assert_eq!(err.path(), "$.repository.owner.created_on");
    }

    #[test]
    fn type_mismatch_message_names_expected_and_missing_tag() {
        let err = DecodeError::TypeMismatch {
            path: "$".to_string(),
            expected: vec!["team"],
            actual: None,
        };
        assert_eq!(err.to_string(), "type mismatch at $: expected one of [team], found missing");
    }
}
