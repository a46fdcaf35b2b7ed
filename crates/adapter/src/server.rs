//! MCP server exposing the single REST tool.

use crate::tool;
use mcp_rest_http_tools::{RestClient, RestError};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParams, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::sync::Arc;

#[derive(Clone)]
pub struct RestApiServer {
    client: RestClient,
    tool: Arc<Tool>,
}

impl RestApiServer {
    #[must_use]
    pub fn new(client: RestClient) -> Self {
        let tool = tool::definition(client.config(), client.auth_scheme());
        Self {
            client,
            tool: Arc::new(tool),
        }
    }

    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        vec![(*self.tool).clone()]
    }

    /// Run one tool call.
    ///
    /// Any HTTP status is a successful result. Transport failures become error results so the
    /// agent can read them; bad arguments are protocol errors.
    ///
    /// # Errors
    ///
    /// Returns `invalid_params` for an unknown tool or invalid arguments, and `internal_error`
    /// for configuration problems detected at call time.
    pub async fn handle_call(
        &self,
        name: &str,
        arguments: Option<&JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        if name != tool::TOOL_NAME {
            return Err(ErrorData::invalid_params(
                format!("unknown tool '{name}'"),
                None,
            ));
        }

        match self.client.call_with_arguments(arguments).await {
            Ok(outcome) => Ok(tool::outcome_result(
                &outcome,
                self.client.config().response_size_limit,
            )),
            Err(e @ RestError::Validation(_)) => {
                tracing::debug!(error = %e, "rejected tool call");
                Err(ErrorData::invalid_params(e.to_string(), None))
            }
            Err(e @ (RestError::Network(_) | RestError::Timeout { .. })) => {
                tracing::warn!(error = %e, "upstream request failed");
                Ok(CallToolResult::error(vec![Content::text(e.to_string())]))
            }
            Err(e @ RestError::Config(_)) => {
                tracing::error!(error = %e, "configuration error during call");
                Err(ErrorData::internal_error(e.to_string(), None))
            }
        }
    }
}

impl ServerHandler for RestApiServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.server_info = Implementation {
            name: "mcp-rest-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Implementation::default()
        };
        info.instructions = Some(format!(
            "Use the '{}' tool to send HTTP requests to {} and inspect the responses.",
            tool::TOOL_NAME,
            self.client.config().base_url
        ));
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.handle_call(&request.name, request.arguments.as_ref())
            .await
    }
}
