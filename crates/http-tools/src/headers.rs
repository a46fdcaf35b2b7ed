//! Header redaction for request echoes and logs.
//!
//! Redaction depends on where a header came from. Headers from the optional source (`HEADER_*`
//! environment entries) are echoed verbatim, even when their name is sensitive. Everything else
//! (caller-supplied and auth-injected headers) has sensitive values replaced by [`REDACTED`].
//!
//! NOTE: the optional-source bypass means a secret placed in a `HEADER_*` variable is echoed back
//! to the caller. Changing that is an open product decision; see DESIGN.md.

use crate::config::RestConfig;

/// Placeholder substituted for sensitive header values.
pub const REDACTED: &str = "[REDACTED]";

/// Header names that are always sensitive (lowercase).
pub const ALWAYS_SENSITIVE_HEADERS: &[&str] = &["authorization"];

/// Provenance of a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderSource {
    /// Supplied with the call, or injected from credentials.
    Request,
    /// Collected from `HEADER_*` environment entries.
    Optional,
}

/// The set of sensitive header names (lowercase) for one configuration.
///
/// Built once and shared by every path that echoes or logs headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveHeaders {
    names: Vec<String>,
}

impl SensitiveHeaders {
    #[must_use]
    pub fn from_config(config: &RestConfig) -> Self {
        Self::with_api_key_header(config.auth.api_key_header_name.as_deref())
    }

    #[must_use]
    pub fn with_api_key_header(api_key_header_name: Option<&str>) -> Self {
        let mut names: Vec<String> = ALWAYS_SENSITIVE_HEADERS
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        if let Some(name) = api_key_header_name.filter(|n| !n.is_empty()) {
            let lower = name.to_ascii_lowercase();
            if !names.contains(&lower) {
                names.push(lower);
            }
        }
        Self { names }
    }

    /// Case-insensitive membership test.
    #[must_use]
    pub fn contains(&self, header_name: &str) -> bool {
        self.names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(header_name))
    }
}

/// Produce a copy of `headers` safe to echo back to the caller or write to logs.
///
/// Keys and order are preserved. For [`HeaderSource::Optional`] this is the identity.
#[must_use]
pub fn sanitize_headers(
    headers: &[(String, String)],
    source: HeaderSource,
    sensitive: &SensitiveHeaders,
) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.clone(),
                sanitize_value(name, value, source, sensitive).to_string(),
            )
        })
        .collect()
}

/// Single-header form of [`sanitize_headers`].
#[must_use]
pub fn sanitize_value<'a>(
    name: &str,
    value: &'a str,
    source: HeaderSource,
    sensitive: &SensitiveHeaders,
) -> &'a str {
    if source == HeaderSource::Request && sensitive.contains(name) {
        REDACTED
    } else {
        value
    }
}

/// Insert or replace a header, matching names case-insensitively.
///
/// A replaced header keeps its position but takes the new spelling of the name.
pub(crate) fn upsert<T>(headers: &mut Vec<(String, T)>, name: &str, value: T) {
    if let Some(slot) = headers
        .iter_mut()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
    {
        slot.0 = name.to_string();
        slot.1 = value;
    } else {
        headers.push((name.to_string(), value));
    }
}
