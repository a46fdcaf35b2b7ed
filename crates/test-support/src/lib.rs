use anyhow::Context as _;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, Request};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::{any, get};
use std::net::{SocketAddr, TcpListener};
use std::process::Child;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
    }
}

/// Pick an unused TCP port on localhost.
///
/// Note: this does not reserve the port; it's still possible for another process to bind it
/// before you do.
///
/// # Errors
///
/// Returns an error if binding an ephemeral localhost port fails or if the bound socket's
/// local address cannot be read.
pub fn pick_unused_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").context("bind ephemeral port")?;
    Ok(listener.local_addr()?.port())
}

/// Poll an HTTP URL until it returns a success status (2xx/3xx).
///
/// # Errors
///
/// Returns an error if the timeout elapses before the endpoint returns a success status.
pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let start = Instant::now();
    loop {
        if start.elapsed() > timeout_dur {
            anyhow::bail!("timed out waiting for {url}");
        }

        match client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => return Ok(()),
            _ => tokio::time::sleep(Duration::from_millis(200)).await,
        }
    }
}

/// Whether `key` configures the adapter (`REST_`, `AUTH_`, `HEADER_`, `MCP_`, any case).
///
/// Tests scrub these from the inherited environment before spawning the binary.
#[must_use]
pub fn is_adapter_env_var(key: &str) -> bool {
    ["REST_", "AUTH_", "HEADER_", "MCP_"].iter().any(|prefix| {
        key.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// In-process upstream REST API for integration tests.
///
/// Routes:
/// - `GET /bytes/{n}`: `n` bytes of `a`
/// - `/status/{code}` (any method): empty body with that status
/// - anything else: echo of the request as text (`METHOD path`, then `name: value` header lines
///   in lowercase, a blank line, and the body)
pub struct EchoUpstream {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl EchoUpstream {
    /// # Errors
    ///
    /// Returns an error if no localhost port can be bound.
    pub async fn start() -> anyhow::Result<Self> {
        let app = Router::new()
            .route("/bytes/{n}", get(bytes))
            .route("/status/{code}", any(status))
            .fallback(echo);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind upstream")?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(Self { addr, handle })
    }

    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for EchoUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn bytes(Path(n): Path<usize>) -> String {
    "a".repeat(n)
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn echo(method: Method, headers: HeaderMap, req: Request) -> String {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| "/".to_string(), ToString::to_string);
    let body: Bytes = axum::body::to_bytes(req.into_body(), 1 << 20)
        .await
        .unwrap_or_default();

    let mut names: Vec<&str> = headers.keys().map(axum::http::HeaderName::as_str).collect();
    names.sort_unstable();
    names.dedup();

    let mut out = format!("{method} {target}\n");
    for name in names {
        for value in headers.get_all(name) {
            out.push_str(name);
            out.push_str(": ");
            out.push_str(value.to_str().unwrap_or("<binary>"));
            out.push('\n');
        }
    }
    out.push('\n');
    out.push_str(&String::from_utf8_lossy(&body));
    out
}
