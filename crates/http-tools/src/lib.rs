//! REST request pipeline for the MCP REST bridge.
//!
//! This crate is used by `mcp-rest-adapter`, which exposes it as a single MCP tool. It contains
//! **no** protocol framing: callers hand in a request descriptor and get back a sanitized,
//! size-bounded response.
//!
//! Pipeline: [`config`] → [`auth`] → [`headers`] → [`runtime`] → [`bounding`].

pub mod auth;
pub mod bounding;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod headers;
pub mod runtime;
pub mod safety;

pub use config::RestConfig;
pub use descriptor::{RequestDescriptor, RestMethod};
pub use error::{RestError, Result};
pub use runtime::{CallOutcome, RestClient};
