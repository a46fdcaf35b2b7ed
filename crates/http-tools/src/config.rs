//! Environment-driven configuration for the REST bridge.
//!
//! The whole record is resolved once at startup ([`RestConfig::from_env`]) and then passed
//! explicitly to every component. Nothing else in this crate reads the process environment.
//!
//! Env:
//! - `REST_BASE_URL` (required): root URL every endpoint is joined onto.
//! - `REST_RESPONSE_SIZE_LIMIT`: max response body bytes returned to the caller (default 10000).
//! - `REST_TIMEOUT`: request timeout in milliseconds (default 30000).
//! - `REST_ENABLE_SSL_VERIFY`: `false` disables certificate verification.
//! - `AUTH_BASIC_USERNAME` / `AUTH_BASIC_PASSWORD`, `AUTH_BEARER`,
//!   `AUTH_APIKEY_HEADER_NAME` / `AUTH_APIKEY_VALUE`: credentials (see [`crate::auth`]).
//! - `HEADER_<name>`: extra header sent with every request (prefix matched case-insensitively).

use crate::error::{RestError, Result};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

pub const ENV_BASE_URL: &str = "REST_BASE_URL";
pub const ENV_RESPONSE_SIZE_LIMIT: &str = "REST_RESPONSE_SIZE_LIMIT";
pub const ENV_TIMEOUT: &str = "REST_TIMEOUT";
pub const ENV_ENABLE_SSL_VERIFY: &str = "REST_ENABLE_SSL_VERIFY";
pub const ENV_BASIC_USERNAME: &str = "AUTH_BASIC_USERNAME";
pub const ENV_BASIC_PASSWORD: &str = "AUTH_BASIC_PASSWORD";
pub const ENV_BEARER: &str = "AUTH_BEARER";
pub const ENV_APIKEY_HEADER_NAME: &str = "AUTH_APIKEY_HEADER_NAME";
pub const ENV_APIKEY_VALUE: &str = "AUTH_APIKEY_VALUE";

/// Prefix (case-insensitive) of environment variables that become custom headers.
pub const CUSTOM_HEADER_PREFIX: &str = "HEADER_";

pub const DEFAULT_RESPONSE_SIZE_LIMIT: usize = 10_000;
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Raw credential settings. Which of them is actually applied is decided by
/// [`crate::auth::active_scheme`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSettings {
    pub basic_username: Option<String>,
    pub basic_password: Option<String>,
    pub bearer_token: Option<String>,
    pub api_key_header_name: Option<String>,
    pub api_key_value: Option<String>,
}

/// Immutable process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// Base URL without trailing slashes.
    pub base_url: String,
    /// Maximum response body size in bytes (always > 0).
    pub response_size_limit: usize,
    /// Hard upper bound on request duration (always > 0).
    pub timeout: Duration,
    pub enable_ssl_verify: bool,
    pub auth: AuthSettings,
    /// `HEADER_*` snapshot taken at startup, sorted by header name.
    pub custom_headers: Vec<(String, String)>,
}

impl RestConfig {
    /// Config with defaults for everything except the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Config`] if `base_url` is not an absolute `http(s)` URL.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            response_size_limit: DEFAULT_RESPONSE_SIZE_LIMIT,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            enable_ssl_verify: true,
            auth: AuthSettings::default(),
            custom_headers: Vec::new(),
        })
    }

    /// Read the process environment once and build the config.
    ///
    /// Entries whose key or value is not valid UTF-8 are ignored.
    ///
    /// # Errors
    ///
    /// See [`RestConfig::from_vars`].
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Build the config from an explicit set of environment entries.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Config`] when `REST_BASE_URL` is missing, empty, or not an absolute
    /// `http(s)` URL, or when `REST_RESPONSE_SIZE_LIMIT` / `REST_TIMEOUT` is present but not a
    /// positive integer.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Vec<(String, String)> =
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let custom_headers = custom_headers_from_vars(vars.iter().cloned());
        let env: HashMap<String, String> = vars.into_iter().collect();

        let base_url = match env.get(ENV_BASE_URL).map(|s| s.trim()) {
            Some(v) if !v.is_empty() => parse_base_url(v)?,
            _ => {
                return Err(RestError::Config(format!(
                    "{ENV_BASE_URL} environment variable is required"
                )));
            }
        };

        let response_size_limit = match env.get(ENV_RESPONSE_SIZE_LIMIT) {
            Some(raw) => usize::try_from(parse_positive(ENV_RESPONSE_SIZE_LIMIT, raw)?)
                .map_err(|_| {
                    RestError::Config(format!("{ENV_RESPONSE_SIZE_LIMIT} is too large: '{raw}'"))
                })?,
            None => DEFAULT_RESPONSE_SIZE_LIMIT,
        };

        let timeout_ms = match env.get(ENV_TIMEOUT) {
            Some(raw) => parse_positive(ENV_TIMEOUT, raw)?,
            None => DEFAULT_TIMEOUT_MS,
        };

        let enable_ssl_verify = !env
            .get(ENV_ENABLE_SSL_VERIFY)
            .is_some_and(|v| v == "false");

        let auth = AuthSettings {
            basic_username: env.get(ENV_BASIC_USERNAME).cloned(),
            basic_password: env.get(ENV_BASIC_PASSWORD).cloned(),
            bearer_token: env.get(ENV_BEARER).cloned(),
            api_key_header_name: env.get(ENV_APIKEY_HEADER_NAME).cloned(),
            api_key_value: env.get(ENV_APIKEY_VALUE).cloned(),
        };

        Ok(Self {
            base_url,
            response_size_limit,
            timeout: Duration::from_millis(timeout_ms),
            enable_ssl_verify,
            auth,
            custom_headers,
        })
    }

    /// Timeout in whole milliseconds, saturating.
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Strip every trailing `/` from a base URL. Idempotent.
#[must_use]
pub fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Validate an absolute `http(s)` URL and return it normalized.
///
/// Shared by the config loader (`REST_BASE_URL`) and the per-call `host` override.
pub(crate) fn check_absolute_http_url(raw: &str) -> std::result::Result<String, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("'{raw}' is not a valid URL: {e}"))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("'{raw}' uses unsupported scheme '{other}'")),
    }
    if url.host_str().is_none() {
        return Err(format!("'{raw}' has no host"));
    }
    Ok(normalize_base_url(raw.trim()))
}

fn parse_base_url(raw: &str) -> Result<String> {
    check_absolute_http_url(raw).map_err(|e| RestError::Config(format!("{ENV_BASE_URL}: {e}")))
}

fn parse_positive(name: &str, raw: &str) -> Result<u64> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(RestError::Config(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
        Ok(v) => Ok(v),
        Err(_) => Err(RestError::Config(format!(
            "{name} must be a positive integer, got '{raw}'"
        ))),
    }
}

/// Collect `HEADER_*` entries (prefix matched case-insensitively) as custom headers.
///
/// The prefix is stripped to form the header name; entries with nothing after the prefix are
/// dropped. The result is sorted by header name.
pub fn custom_headers_from_vars<I, K, V>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let prefix_len = CUSTOM_HEADER_PREFIX.len();
    let mut out: Vec<(String, String)> = vars
        .into_iter()
        .filter_map(|(k, v)| {
            let key = k.as_ref();
            if !key.is_char_boundary(prefix_len.min(key.len())) || key.len() <= prefix_len {
                return None;
            }
            let (prefix, name) = key.split_at(prefix_len);
            prefix
                .eq_ignore_ascii_case(CUSTOM_HEADER_PREFIX)
                .then(|| (name.to_string(), v.into()))
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}
