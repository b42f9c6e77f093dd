//! OAuth 2.0 grants accepted by the token endpoint

use std::fmt;

use url::Url;

/// A credential exchange submitted to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
    /// Code returned to the redirect URI after the user authorized the consumer.
    AuthorizationCode { code: String, redirect_uri: Option<Url> },
    /// Resource owner password credentials.
    Password { username: String, password: String },
    RefreshToken { refresh_token: String },
}

impl Grant {
    /// Value of the `grant_type` form field.
    #[must_use]
    pub const fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }

    /// Form fields for the token request body. Client credentials are sent
    /// as HTTP Basic authentication, never here.
    #[must_use]
    pub fn form_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("grant_type".to_string(), self.grant_type().to_string())];
        match self {
            Self::AuthorizationCode { code, redirect_uri } => {
                params.push(("code".to_string(), code.clone()));
                if let Some(uri) = redirect_uri {
                    params.push(("redirect_uri".to_string(), uri.to_string()));
                }
            }
            Self::Password { username, password } => {
                params.push(("username".to_string(), username.clone()));
                params.push(("password".to_string(), password.clone()));
            }
            Self::RefreshToken { refresh_token } => {
                params.push(("refresh_token".to_string(), refresh_token.clone()));
            }
        }
        params
    }
}

impl fmt::Debug for Grant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthorizationCode { redirect_uri, .. } => f
                .debug_struct("AuthorizationCode")
                .field("redirect_uri", &redirect_uri.as_ref().map(Url::as_str))
                .finish_non_exhaustive(),
            Self::Password { username, .. } => {
                f.debug_struct("Password").field("username", username).finish_non_exhaustive()
            }
            Self::RefreshToken { .. } => f.debug_struct("RefreshToken").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_code_omits_absent_redirect_uri() {
        let grant = Grant::AuthorizationCode { code: "c0de".into(), redirect_uri: None };
        assert_eq!(
            grant.form_params(),
            vec![
                ("grant_type".to_string(), "authorization_code".to_string()),
                ("code".to_string(), "c0de".to_string()),
            ]
        );
    }

    #[test]
    fn authorization_code_with_redirect_uri() {
        let grant = Grant::AuthorizationCode {
            code: "c0de".into(),
            redirect_uri: Some(Url::parse("https://app.example.org/callback").unwrap()),
        };
        let params = grant.form_params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[2].1, "https://app.example.org/callback");
    }

    #[test]
    fn password_and_refresh_fields() {
        let password = Grant::Password { username: "ada".into(), password: "pw".into() };
        assert_eq!(password.grant_type(), "password");
        assert_eq!(password.form_params()[1], ("username".to_string(), "ada".to_string()));

        let refresh = Grant::RefreshToken { refresh_token: "def".into() };
        assert_eq!(refresh.form_params()[1], ("refresh_token".to_string(), "def".to_string()));
    }

    #[test]
    fn debug_hides_secrets() {
        let rendered = format!(
            "{:?} {:?}",
            Grant::Password { username: "ada".into(), password: "hunter2".into() },
            Grant::RefreshToken { refresh_token: "def-token".into() }
        );
        assert!(rendered.contains("ada"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("def-token"));
    }
}
