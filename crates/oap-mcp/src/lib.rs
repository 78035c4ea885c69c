//! oap-mcp – tool gateway between MCP clients and the OAP backend API.
//!
//! The crate is transport-agnostic: [`McpServer::handle`] takes one decoded
//! JSON-RPC message and returns the response (if any). HTTP/SSE transports
//! live in `oap-server`.
//!
//! Layout:
//! - [`client`]   – thin `reqwest` wrapper that talks to the OAP API.
//! - [`envelope`] – the uniform tool result shape.
//! - [`catalog`]  – name → schema-validated handler registry.
//! - [`tools`]    – the OAP tool set, including the chained operations.
//! - [`protocol`] – JSON-RPC 2.0 / MCP method dispatch.

pub mod catalog;
pub mod client;
pub mod envelope;
pub mod error;
pub mod protocol;
pub mod tools;

pub use catalog::{ToolCatalog, ToolDefinition, ToolHandler};
pub use client::{CallOptions, OapClient, OapClientConfig};
pub use envelope::{Content, ToolResult};
pub use error::{ToolError, UpstreamError};
pub use protocol::{McpServer, ServerInfo};

/// Build a [`ToolCatalog`] pre-populated with every OAP tool.
pub fn oap_catalog(client: OapClient) -> Result<ToolCatalog, ToolError> {
    let mut catalog = ToolCatalog::new();
    tools::register_oap_tools(&mut catalog, client)?;
    Ok(catalog)
}
