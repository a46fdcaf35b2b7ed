//! Inbound request descriptors and their validation.

use crate::config::check_absolute_http_url;
use crate::error::{RestError, Result};
use rmcp::model::JsonObject;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// The HTTP verbs the bridge accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl RestMethod {
    pub const ALL: [Self; 5] = [Self::Get, Self::Post, Self::Put, Self::Delete, Self::Patch];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    #[must_use]
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

impl fmt::Display for RestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestMethod {
    type Err = RestError;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| {
                RestError::Validation(format!(
                    "Invalid method '{s}': expected one of GET, POST, PUT, DELETE, PATCH"
                ))
            })
    }
}

/// A validated request, before endpoint resolution and header merging.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: RestMethod,
    /// Path (and optional query) appended to the base URL; always starts with `/`.
    pub endpoint: String,
    /// Caller-supplied headers in the order given.
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Absolute `http(s)` URL replacing the configured base URL, without trailing slash.
    pub host: Option<String>,
}

impl RequestDescriptor {
    #[must_use]
    pub fn new(method: RestMethod, endpoint: &str) -> Self {
        Self {
            method,
            endpoint: normalize_endpoint(endpoint),
            headers: Vec::new(),
            body: None,
            host: None,
        }
    }

    /// Validate raw tool-call arguments.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Validation`] if arguments are missing, `method` is not one of the five
    /// supported verbs, `endpoint` is not a path string, `headers` is not a flat object of
    /// strings, or `host` is not an absolute `http(s)` URL.
    pub fn from_arguments(arguments: Option<&JsonObject>) -> Result<Self> {
        let Some(args) = arguments else {
            return Err(RestError::Validation(
                "Missing arguments: 'method' and 'endpoint' are required".to_string(),
            ));
        };

        let method = match args.get("method") {
            Some(Value::String(m)) => m.parse::<RestMethod>()?,
            Some(other) => {
                return Err(RestError::Validation(format!(
                    "'method' must be a string, got {}",
                    json_type(other)
                )));
            }
            None => return Err(RestError::Validation("Missing 'method'".to_string())),
        };

        let endpoint = match args.get("endpoint") {
            Some(Value::String(e)) => e,
            Some(other) => {
                return Err(RestError::Validation(format!(
                    "'endpoint' must be a string, got {}",
                    json_type(other)
                )));
            }
            None => return Err(RestError::Validation("Missing 'endpoint'".to_string())),
        };
        if Url::parse(endpoint).is_ok_and(|u| u.has_host()) {
            return Err(RestError::Validation(format!(
                "'endpoint' must be a path relative to the base URL, got '{endpoint}'; use 'host' to target a different server"
            )));
        }

        let headers = match args.get("headers") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.clone(), s.clone())),
                    other => Err(RestError::Validation(format!(
                        "Header '{k}' must be a string, got {}",
                        json_type(other)
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(RestError::Validation(format!(
                    "'headers' must be an object of strings, got {}",
                    json_type(other)
                )));
            }
        };

        let host = match args.get("host") {
            None | Some(Value::Null) => None,
            Some(Value::String(h)) => Some(
                check_absolute_http_url(h)
                    .map_err(|e| RestError::Validation(format!("Invalid 'host': {e}")))?,
            ),
            Some(other) => {
                return Err(RestError::Validation(format!(
                    "'host' must be a string, got {}",
                    json_type(other)
                )));
            }
        };

        let body = match args.get("body") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.clone()),
        };

        Ok(Self {
            method,
            endpoint: normalize_endpoint(endpoint),
            headers,
            body,
            host,
        })
    }
}

/// Collapse leading slashes into exactly one.
#[must_use]
pub fn normalize_endpoint(endpoint: &str) -> String {
    format!("/{}", endpoint.trim().trim_start_matches('/'))
}

fn json_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> JsonObject {
        v.as_object().cloned().expect("object")
    }

    #[test]
    fn accepts_all_five_verbs_case_insensitively() {
        for (raw, expected) in [
            ("GET", RestMethod::Get),
            ("post", RestMethod::Post),
            (" Put ", RestMethod::Put),
            ("DELETE", RestMethod::Delete),
            ("patch", RestMethod::Patch),
        ] {
            let d = RequestDescriptor::from_arguments(Some(&args(
                json!({"method": raw, "endpoint": "/x"}),
            )))
            .expect("valid");
            assert_eq!(d.method, expected);
        }
    }

    #[test]
    fn rejects_unknown_or_non_string_methods() {
        for method in [json!("INVALID"), json!("HEAD"), json!(""), json!(1), json!(null)] {
            let err = RequestDescriptor::from_arguments(Some(&args(
                json!({"method": method, "endpoint": "/users"}),
            )))
            .unwrap_err();
            assert!(matches!(err, RestError::Validation(_)), "{method}");
        }
    }

    #[test]
    fn missing_arguments_and_fields_are_validation_errors() {
        assert!(matches!(
            RequestDescriptor::from_arguments(None).unwrap_err(),
            RestError::Validation(_)
        ));
        assert!(matches!(
            RequestDescriptor::from_arguments(Some(&args(json!({"endpoint": "/x"})))).unwrap_err(),
            RestError::Validation(_)
        ));
        assert!(matches!(
            RequestDescriptor::from_arguments(Some(&args(json!({"method": "GET"})))).unwrap_err(),
            RestError::Validation(_)
        ));
        assert!(matches!(
            RequestDescriptor::from_arguments(Some(&args(
                json!({"method": "GET", "endpoint": ["/x"]})
            )))
            .unwrap_err(),
            RestError::Validation(_)
        ));
    }

    #[test]
    fn endpoint_is_normalized_and_must_be_relative() {
        let d = RequestDescriptor::from_arguments(Some(&args(
            json!({"method": "GET", "endpoint": "users?page=2"}),
        )))
        .expect("valid");
        assert_eq!(d.endpoint, "/users?page=2");

        let d = RequestDescriptor::from_arguments(Some(&args(
            json!({"method": "GET", "endpoint": "//users"}),
        )))
        .expect("valid");
        assert_eq!(d.endpoint, "/users");

        let err = RequestDescriptor::from_arguments(Some(&args(
            json!({"method": "GET", "endpoint": "https://evil.example.com/x"}),
        )))
        .unwrap_err();
        assert!(err.to_string().contains("host"));
    }

    #[test]
    fn urls_in_the_query_string_are_allowed() {
        let d = RequestDescriptor::from_arguments(Some(&args(json!({
            "method": "GET",
            "endpoint": "/oauth/authorize?redirect_uri=https://app.example.com/cb"
        }))))
        .expect("valid");
        assert_eq!(
            d.endpoint,
            "/oauth/authorize?redirect_uri=https://app.example.com/cb"
        );

        let d = RequestDescriptor::from_arguments(Some(&args(
            json!({"method": "POST", "endpoint": "/v1/things:batchGet"}),
        )))
        .expect("valid");
        assert_eq!(d.endpoint, "/v1/things:batchGet");
    }

    #[test]
    fn headers_must_be_a_flat_string_map() {
        let d = RequestDescriptor::from_arguments(Some(&args(json!({
            "method": "GET",
            "endpoint": "/x",
            "headers": {"X-Trace": "t-1", "Accept": "application/json"}
        }))))
        .expect("valid");
        assert_eq!(d.headers.len(), 2);
        assert!(d.headers.contains(&("X-Trace".to_string(), "t-1".to_string())));

        for headers in [
            json!({"X-Count": 1}),
            json!({"X-Nested": {"a": "b"}}),
            json!(["X-Trace"]),
            json!("X-Trace: 1"),
        ] {
            let err = RequestDescriptor::from_arguments(Some(&args(json!({
                "method": "GET",
                "endpoint": "/x",
                "headers": headers
            }))))
            .unwrap_err();
            assert!(matches!(err, RestError::Validation(_)));
        }
    }

    #[test]
    fn host_override_must_be_absolute_http_and_is_normalized() {
        let d = RequestDescriptor::from_arguments(Some(&args(json!({
            "method": "GET",
            "endpoint": "/x",
            "host": "https://other.example.com//"
        }))))
        .expect("valid");
        assert_eq!(d.host.as_deref(), Some("https://other.example.com"));

        for host in [json!("other.example.com"), json!("ftp://x"), json!(5)] {
            let err = RequestDescriptor::from_arguments(Some(&args(json!({
                "method": "GET",
                "endpoint": "/x",
                "host": host
            }))))
            .unwrap_err();
            assert!(matches!(err, RestError::Validation(_)));
        }
    }

    #[test]
    fn null_body_means_no_body() {
        let d = RequestDescriptor::from_arguments(Some(&args(
            json!({"method": "POST", "endpoint": "/x", "body": null}),
        )))
        .expect("valid");
        assert_eq!(d.body, None);

        let d = RequestDescriptor::from_arguments(Some(&args(
            json!({"method": "POST", "endpoint": "/x", "body": {"name": "a"}}),
        )))
        .expect("valid");
        assert_eq!(d.body, Some(json!({"name": "a"})));
    }
}
