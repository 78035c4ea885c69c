//! MCP wiring for the server: the tool catalog plus server-local tools, and
//! the SSE session registry used by the HTTP transports in `routes::mcp`.

mod notes_tool;
mod sessions;

pub use notes_tool::ListNotesTool;
pub use sessions::SessionRegistry;

use std::sync::Arc;

use oap_mcp::{McpServer, OapClient, ServerInfo, ToolError, oap_catalog};
use serde_json::json;

use crate::config::Config;
use crate::entities::SqliteStore;

/// Build the MCP server: every OAP tool plus `listNotes`.
pub fn build_mcp_server(config: &Config, store: Arc<SqliteStore>) -> Result<McpServer, ToolError> {
    let client = OapClient::new(config.upstream())?;
    let mut catalog = oap_catalog(client)?;
    catalog.register(
        "listNotes",
        "List all notes (internal DB)",
        json!({ "type": "object", "properties": {} }),
        Arc::new(ListNotesTool::new(store)),
    )?;
    Ok(McpServer::new(ServerInfo::default(), catalog))
}
