#![allow(dead_code)]

use anyhow::Context as _;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

pub use mcp_rest_test_support::{EchoUpstream, KillOnDrop, is_adapter_env_var};

pub fn pick_unused_port() -> anyhow::Result<u16> {
    mcp_rest_test_support::pick_unused_port()
}

pub async fn wait_http_ok(url: &str, timeout_dur: Duration) -> anyhow::Result<()> {
    mcp_rest_test_support::wait_http_ok(url, timeout_dur).await
}

/// Build an adapter command with only the given upstream settings in its environment.
pub fn adapter_command(env: &[(&str, &str)]) -> Command {
    let bin = env!("CARGO_BIN_EXE_mcp-rest-api");
    let mut cmd = Command::new(bin);
    for (key, _) in std::env::vars_os() {
        if key.to_str().is_some_and(is_adapter_env_var) {
            cmd.env_remove(&key);
        }
    }
    cmd.envs(env.iter().copied())
        .arg("--log-level")
        .arg("info");
    cmd
}

pub fn spawn_adapter(env: &[(&str, &str)], port: u16) -> anyhow::Result<Child> {
    adapter_command(env)
        .arg("--transport")
        .arg("http")
        .arg("--bind")
        .arg(format!("127.0.0.1:{port}"))
        .stdout(Stdio::null())
        .spawn()
        .context("spawn adapter")
}

pub async fn start_adapter(env: &[(&str, &str)]) -> anyhow::Result<(String, KillOnDrop)> {
    let port = pick_unused_port()?;
    let child = KillOnDrop(spawn_adapter(env, port)?);

    let base_url = format!("http://127.0.0.1:{port}");
    wait_http_ok(&format!("{base_url}/health"), Duration::from_secs(20)).await?;
    Ok((base_url, child))
}
