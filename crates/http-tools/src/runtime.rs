//! Request execution against the configured REST API.
//!
//! A [`RestClient`] is built once from the immutable [`RestConfig`] and shared across concurrent
//! calls. Each call is independent: resolve the target URL, merge headers, send exactly one
//! request, and bound the response body.

use crate::auth::{self, AuthScheme};
use crate::bounding::BoundedCollector;
use crate::config::RestConfig;
use crate::descriptor::{RequestDescriptor, RestMethod};
use crate::error::{RestError, Result};
use crate::headers::{HeaderSource, SensitiveHeaders, sanitize_value, upsert};
use crate::safety::{redact_url, sanitize_reqwest_error};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::model::JsonObject;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

/// One outbound header and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedHeader {
    pub name: String,
    pub value: String,
    pub source: HeaderSource,
}

/// A fully resolved request, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: RestMethod,
    pub url: Url,
    /// Merged headers: custom < caller < auth (later wins, names compared case-insensitively).
    pub headers: Vec<PreparedHeader>,
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// Headers with sensitive values redacted according to their provenance.
    #[must_use]
    pub fn sanitized_headers(&self, sensitive: &SensitiveHeaders) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|h| {
                (
                    h.name.clone(),
                    sanitize_value(&h.name, &h.value, h.source, sensitive).to_string(),
                )
            })
            .collect()
    }
}

/// What was sent, safe to hand back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEcho {
    pub url: String,
    pub method: RestMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth_method: &'static str,
}

/// The upstream response after size bounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseDescriptor {
    pub status: u16,
    pub status_text: String,
    /// Response headers as received (not redacted).
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub truncated: bool,
    /// Body size in bytes before truncation.
    pub original_bytes: usize,
    pub elapsed: Duration,
}

impl ResponseDescriptor {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Result of one bridged call.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub request: RequestEcho,
    pub response: ResponseDescriptor,
}

#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    config: RestConfig,
    client: Client,
    auth: Option<AuthScheme>,
    sensitive: SensitiveHeaders,
}

impl RestClient {
    /// Build the client for a config.
    ///
    /// The resulting instance is immutable and safe to share across tasks.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Config`] if the HTTP client cannot be built (e.g. TLS backend
    /// initialization failure) or a configured header is not valid HTTP.
    pub fn new(config: RestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.enable_ssl_verify)
            .user_agent(concat!("mcp-rest-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RestError::Config(format!(
                    "failed to build HTTP client: {}",
                    sanitize_reqwest_error(&e)
                ))
            })?;

        if !config.enable_ssl_verify {
            warn!(
                base_url = %config.base_url,
                "TLS certificate verification is disabled"
            );
        }

        let auth = auth::active_scheme(&config);
        let static_headers = config
            .custom_headers
            .iter()
            .cloned()
            .chain(auth.iter().flat_map(AuthScheme::headers));
        for (name, value) in static_headers {
            check_header(&name, &value).map_err(|e| match e {
                RestError::Validation(msg) => RestError::Config(msg),
                other => other,
            })?;
        }

        let sensitive = SensitiveHeaders::from_config(&config);

        Ok(Self {
            inner: Arc::new(RestClientInner {
                config,
                client,
                auth,
                sensitive,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &RestConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn sensitive_headers(&self) -> &SensitiveHeaders {
        &self.inner.sensitive
    }

    /// The auth scheme applied to every request, if any.
    #[must_use]
    pub fn auth_scheme(&self) -> Option<&AuthScheme> {
        self.inner.auth.as_ref()
    }

    /// Label of the auth scheme applied to every request (`none` if unauthenticated).
    #[must_use]
    pub fn auth_method(&self) -> &'static str {
        auth::method_label(self.auth_scheme())
    }

    /// Resolve the target URL and merge headers for a descriptor. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Validation`] if the joined URL does not parse or a header name or
    /// value is not valid HTTP.
    pub fn prepare(&self, descriptor: RequestDescriptor) -> Result<PreparedRequest> {
        let RequestDescriptor {
            method,
            endpoint,
            headers: caller_headers,
            body,
            host,
        } = descriptor;

        let base = host.as_deref().unwrap_or(&self.inner.config.base_url);
        let url = build_url(base, &endpoint)?;

        let mut merged: Vec<(String, (String, HeaderSource))> = Vec::new();
        for (name, value) in &self.inner.config.custom_headers {
            upsert(&mut merged, name, (value.clone(), HeaderSource::Optional));
        }
        for (name, value) in caller_headers {
            upsert(&mut merged, &name, (value, HeaderSource::Request));
        }
        if let Some(scheme) = &self.inner.auth {
            for (name, value) in scheme.headers() {
                upsert(&mut merged, &name, (value, HeaderSource::Request));
            }
        }

        let headers = merged
            .into_iter()
            .map(|(name, (value, source))| {
                check_header(&name, &value)?;
                Ok(PreparedHeader {
                    name,
                    value,
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(PreparedRequest {
            method,
            url,
            headers,
            body,
        })
    }

    /// Send a prepared request once and bound the response.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Timeout`] when the configured timeout elapses (no partial response is
    /// kept) and [`RestError::Network`] for connection, DNS, or TLS failures. Non-2xx statuses
    /// are returned as data.
    pub async fn execute(&self, prepared: &PreparedRequest) -> Result<ResponseDescriptor> {
        let inner = &*self.inner;
        let redacted = redact_url(&prepared.url);

        debug!(
            method = %prepared.method,
            url = %redacted,
            headers = ?prepared.sanitized_headers(&inner.sensitive),
            "sending request"
        );

        let mut request = inner
            .client
            .request(prepared.method.to_reqwest(), prepared.url.clone());
        request = apply_headers(request, &prepared.headers);
        request = apply_body(request, prepared.body.as_ref());

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let headers = response_headers(response.headers());
        let bounded = read_body_bounded(response, inner.config.response_size_limit)
            .await
            .map_err(|e| self.transport_error(&e))?;
        let elapsed = started.elapsed();

        info!(
            method = %prepared.method,
            url = %redacted,
            status = status.as_u16(),
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            body_bytes = bounded.original_bytes,
            truncated = bounded.truncated,
            "request completed"
        );

        Ok(ResponseDescriptor {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            headers,
            body: bounded.body,
            truncated: bounded.truncated,
            original_bytes: bounded.original_bytes,
            elapsed,
        })
    }

    /// Prepare, echo, and execute a validated descriptor.
    ///
    /// # Errors
    ///
    /// See [`RestClient::prepare`] and [`RestClient::execute`].
    pub async fn call(&self, descriptor: RequestDescriptor) -> Result<CallOutcome> {
        let prepared = self.prepare(descriptor)?;
        let request = RequestEcho {
            url: prepared.url.to_string(),
            method: prepared.method,
            headers: prepared.sanitized_headers(&self.inner.sensitive),
            body: prepared.body.clone(),
            auth_method: self.auth_method(),
        };
        let response = self.execute(&prepared).await?;
        Ok(CallOutcome { request, response })
    }

    /// Validate raw tool arguments, then [`RestClient::call`].
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Validation`] before any network activity if the arguments are
    /// malformed; otherwise see [`RestClient::call`].
    pub async fn call_with_arguments(&self, arguments: Option<&JsonObject>) -> Result<CallOutcome> {
        let descriptor = RequestDescriptor::from_arguments(arguments)?;
        self.call(descriptor).await
    }

    fn transport_error(&self, e: &reqwest::Error) -> RestError {
        if e.is_timeout() {
            RestError::Timeout {
                timeout_ms: self.inner.config.timeout_ms(),
            }
        } else if e.is_builder() {
            RestError::Validation(sanitize_reqwest_error(e))
        } else {
            RestError::Network(sanitize_reqwest_error(e))
        }
    }
}

fn build_url(base: &str, endpoint: &str) -> Result<Url> {
    let raw = format!("{}{}", base.trim_end_matches('/'), endpoint);
    Url::parse(&raw).map_err(|e| RestError::Validation(format!("Invalid URL '{raw}': {e}")))
}

fn check_header(name: &str, value: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| RestError::Validation(format!("Invalid header name '{name}'")))?;
    HeaderValue::from_str(value)
        .map_err(|_| RestError::Validation(format!("Invalid value for header '{name}'")))?;
    Ok(())
}

fn apply_headers(
    mut request: reqwest::RequestBuilder,
    headers: &[PreparedHeader],
) -> reqwest::RequestBuilder {
    for h in headers {
        request = request.header(&h.name, &h.value);
    }
    request
}

fn apply_body(
    mut request: reqwest::RequestBuilder,
    body: Option<&Value>,
) -> reqwest::RequestBuilder {
    match body {
        // Strings go out verbatim so callers can send form data, XML, etc.
        Some(Value::String(s)) => request = request.body(s.clone()),
        Some(other) => request = request.json(other),
        None => {}
    }
    request
}

fn response_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect()
}

async fn read_body_bounded(
    mut response: reqwest::Response,
    limit: usize,
) -> std::result::Result<crate::bounding::BoundedBody, reqwest::Error> {
    let mut collector = BoundedCollector::new(limit);
    while let Some(chunk) = response.chunk().await? {
        collector.push(&chunk);
    }
    Ok(collector.finish())
}
