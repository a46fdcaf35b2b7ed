//! Credential injection.
//!
//! At most one scheme is applied per request. When several are configured the precedence is
//! fixed: basic > bearer > api-key. A scheme missing any of its parts is skipped, never an error.

use crate::config::RestConfig;
use base64::Engine as _;

/// The single authentication scheme applied to outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthScheme {
    Basic { username: String, password: String },
    Bearer { token: String },
    ApiKey { header_name: String, value: String },
}

impl AuthScheme {
    /// Stable label reported back to callers (never includes secret material).
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
            Self::ApiKey { .. } => "api-key",
        }
    }

    /// Headers this scheme contributes to a request.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            Self::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{username}:{password}"));
                vec![("Authorization".to_string(), format!("Basic {encoded}"))]
            }
            Self::Bearer { token } => {
                vec![("Authorization".to_string(), format!("Bearer {token}"))]
            }
            Self::ApiKey { header_name, value } => vec![(header_name.clone(), value.clone())],
        }
    }
}

fn non_empty(v: Option<&String>) -> Option<&str> {
    v.map(String::as_str).filter(|s| !s.is_empty())
}

#[must_use]
pub fn has_basic_auth(config: &RestConfig) -> bool {
    non_empty(config.auth.basic_username.as_ref()).is_some()
        && non_empty(config.auth.basic_password.as_ref()).is_some()
}

#[must_use]
pub fn has_bearer_auth(config: &RestConfig) -> bool {
    non_empty(config.auth.bearer_token.as_ref()).is_some()
}

#[must_use]
pub fn has_api_key_auth(config: &RestConfig) -> bool {
    non_empty(config.auth.api_key_header_name.as_ref()).is_some()
        && non_empty(config.auth.api_key_value.as_ref()).is_some()
}

/// Pick the first fully configured scheme in precedence order.
#[must_use]
pub fn active_scheme(config: &RestConfig) -> Option<AuthScheme> {
    let auth = &config.auth;
    if let (Some(username), Some(password)) = (
        non_empty(auth.basic_username.as_ref()),
        non_empty(auth.basic_password.as_ref()),
    ) {
        return Some(AuthScheme::Basic {
            username: username.to_string(),
            password: password.to_string(),
        });
    }

    if let Some(token) = non_empty(auth.bearer_token.as_ref()) {
        return Some(AuthScheme::Bearer {
            token: token.to_string(),
        });
    }

    if let (Some(header_name), Some(value)) = (
        non_empty(auth.api_key_header_name.as_ref()),
        non_empty(auth.api_key_value.as_ref()),
    ) {
        return Some(AuthScheme::ApiKey {
            header_name: header_name.to_string(),
            value: value.to_string(),
        });
    }

    None
}

/// Headers to merge into every outgoing request; empty when no scheme is configured.
#[must_use]
pub fn resolve_auth_headers(config: &RestConfig) -> Vec<(String, String)> {
    active_scheme(config)
        .map(|s| s.headers())
        .unwrap_or_default()
}

/// Label reported for an optional scheme: its [`AuthScheme::label`], or `none`.
#[must_use]
pub fn method_label(scheme: Option<&AuthScheme>) -> &'static str {
    scheme.map_or("none", AuthScheme::label)
}
