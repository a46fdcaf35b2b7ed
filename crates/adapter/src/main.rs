//! MCP server exposing a REST API through a single `test_request` tool.

mod error;
mod server;
mod tool;

use crate::error::{AdapterError, Result};
use crate::server::RestApiServer;
use axum::Router;
use axum::routing::get;
use clap::{Parser, ValueEnum};
use mcp_rest_http_tools::{RestClient, RestConfig};
use rmcp::ServiceExt as _;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::net::SocketAddr;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Expose a REST API to MCP clients. Upstream settings come from `REST_*`, `AUTH_*`, and
/// `HEADER_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "mcp-rest-api", version, about)]
struct Cli {
    /// MCP transport to serve.
    #[arg(long, value_enum, env = "MCP_TRANSPORT", default_value = "stdio")]
    transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = "MCP_BIND", default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Log filter (tracing `EnvFilter` syntax).
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "adapter exited with error");
            e.exit_code()
        }
    }
}

/// Logs go to stderr; stdout carries the stdio transport.
fn init_tracing(filter: &str, format: LogFormat) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = RestConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        response_size_limit = config.response_size_limit,
        timeout_ms = config.timeout_ms(),
        ssl_verify = config.enable_ssl_verify,
        custom_headers = config.custom_headers.len(),
        "configuration loaded"
    );

    let client = RestClient::new(config)?;
    tracing::info!(auth = client.auth_method(), "authentication resolved");
    let server = RestApiServer::new(client);

    match cli.transport {
        Transport::Stdio => serve_stdio(server).await,
        Transport::Http => serve_http(server, cli.bind).await,
    }
}

async fn serve_stdio(server: RestApiServer) -> Result<()> {
    tracing::info!("serving MCP over stdio");
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| AdapterError::Startup(format!("stdio handshake failed: {e}")))?;
    running
        .waiting()
        .await
        .map_err(|e| AdapterError::Runtime(format!("stdio transport stopped: {e}")))?;
    Ok(())
}

async fn serve_http(server: RestApiServer, bind: SocketAddr) -> Result<()> {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", mcp);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| AdapterError::Startup(format!("failed to bind {bind}: {e}")))?;
    tracing::info!(%bind, "serving MCP over streamable HTTP at /mcp");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_stdio() {
        let cli = Cli::try_parse_from(["mcp-rest-api"]).expect("parse");
        assert_eq!(cli.transport, Transport::Stdio);
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn cli_accepts_http_transport_and_bind() {
        let cli = Cli::try_parse_from([
            "mcp-rest-api",
            "--transport",
            "http",
            "--bind",
            "127.0.0.1:9000",
            "--log-format",
            "json",
        ])
        .expect("parse");
        assert_eq!(cli.transport, Transport::Http);
        assert_eq!(cli.bind.port(), 9000);
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
