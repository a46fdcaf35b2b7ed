//! The `test_request` tool: definition and result rendering.

use mcp_rest_http_tools::auth::AuthScheme;
use mcp_rest_http_tools::RestConfig;
use mcp_rest_http_tools::RestMethod;
use mcp_rest_http_tools::runtime::CallOutcome;
use rmcp::model::{CallToolResult, Content, JsonObject, Tool, ToolAnnotations};
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::sync::Arc;

pub const TOOL_NAME: &str = "test_request";

/// Build the MCP tool advertised by the server.
///
/// The description reflects the live configuration so the agent knows where requests go and how
/// they are authenticated. Header values and credentials are never included.
#[must_use]
pub fn definition(config: &RestConfig, auth: Option<&AuthScheme>) -> Tool {
    let schema = input_schema();
    let schema_obj = schema.as_object().cloned().unwrap_or_else(JsonObject::new);
    let mut tool = Tool::new(
        TOOL_NAME.to_string(),
        describe(config, auth),
        Arc::new(schema_obj),
    );
    // The tool can issue any verb, so assume the worst for every hint.
    tool.annotations = Some(ToolAnnotations {
        title: Some("REST API request".to_string()),
        read_only_hint: Some(false),
        destructive_hint: Some(true),
        idempotent_hint: Some(false),
        open_world_hint: Some(true),
    });
    tool
}

fn input_schema() -> Value {
    let methods: Vec<&str> = RestMethod::ALL.iter().map(|m| m.as_str()).collect();
    json!({
        "type": "object",
        "properties": {
            "method": {
                "type": "string",
                "enum": methods,
                "description": "HTTP method to use"
            },
            "endpoint": {
                "type": "string",
                "description": "Endpoint path appended to the base URL, e.g. \"/users\" or \"/users?page=2\""
            },
            "body": {
                "description": "Optional request body. Strings are sent verbatim, anything else as JSON."
            },
            "headers": {
                "type": "object",
                "additionalProperties": { "type": "string" },
                "description": "Optional request headers for this call. They override configured custom headers."
            },
            "host": {
                "type": "string",
                "description": "Optional absolute base URL (e.g. \"https://staging.example.com\") used instead of the configured one"
            }
        },
        "required": ["method", "endpoint"]
    })
}

fn describe(config: &RestConfig, auth: Option<&AuthScheme>) -> String {
    let mut out = format!(
        "Send an HTTP request to the REST API at {} and inspect the response (status, headers, body, timing).",
        config.base_url
    );
    let summary = match auth {
        Some(AuthScheme::Basic { .. }) => "Basic authentication".to_string(),
        Some(AuthScheme::Bearer { .. }) => "Bearer token authentication".to_string(),
        Some(AuthScheme::ApiKey { header_name, .. }) => format!("API key header {header_name}"),
        None => "none".to_string(),
    };
    let _ = write!(out, "\n\nAuthentication: {summary} (applied automatically).");
    if !config.custom_headers.is_empty() {
        let names: Vec<&str> = config
            .custom_headers
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        let _ = write!(
            out,
            "\nCustom headers sent with every request: {}.",
            names.join(", ")
        );
    }
    let _ = write!(
        out,
        "\nResponse bodies larger than {} bytes are truncated.",
        config.response_size_limit
    );
    if !config.enable_ssl_verify {
        out.push_str("\nTLS certificate verification is disabled.");
    }
    out.push_str(
        "\n\nNon-2xx responses are returned as results (check response.statusCode); \
         sensitive request headers are shown as [REDACTED].",
    );
    out
}

/// Fold header pairs into a JSON object; repeated names are joined with `, `.
#[must_use]
pub fn headers_json(headers: &[(String, String)]) -> Value {
    let mut map = JsonObject::new();
    for (name, value) in headers {
        match map.get_mut(name) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                map.insert(name.clone(), Value::String(value.clone()));
            }
        }
    }
    Value::Object(map)
}

/// Render a completed call (any status) as the tool's JSON document.
#[must_use]
pub fn render_outcome(outcome: &CallOutcome, response_size_limit: usize) -> Value {
    let CallOutcome { request, response } = outcome;

    let mut messages: Vec<String> = Vec::new();
    let is_error = response.status >= 400;
    if is_error {
        messages.push(format!(
            "Request failed with status {} {}",
            response.status, response.status_text
        ));
    } else {
        messages.push("Request completed".to_string());
    }
    if response.truncated {
        messages.push(format!(
            "Response body truncated: showing {} of {} bytes (limit {response_size_limit} bytes, see REST_RESPONSE_SIZE_LIMIT)",
            response.body.len(),
            response.original_bytes
        ));
    }

    let mut response_json = json!({
        "statusCode": response.status,
        "statusText": response.status_text,
        "timing": format!("{}ms", response.elapsed.as_millis()),
        "headers": headers_json(&response.headers),
        "body": response.body,
        "truncated": response.truncated,
    });
    if response.truncated {
        response_json["originalSize"] = json!(response.original_bytes);
    }

    json!({
        "request": {
            "url": request.url,
            "method": request.method.as_str(),
            "headers": headers_json(&request.headers),
            "body": request.body,
            "authMethod": request.auth_method,
        },
        "response": response_json,
        "validation": {
            "isError": is_error,
            "messages": messages,
        }
    })
}

/// Wrap a rendered outcome as a successful tool result.
#[must_use]
pub fn outcome_result(outcome: &CallOutcome, response_size_limit: usize) -> CallToolResult {
    let doc = render_outcome(outcome, response_size_limit);
    let text = serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string());
    CallToolResult::success(vec![Content::text(text)])
}
