//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use oap_mcp::{McpServer, ToolError};

use crate::auth::JwtKeys;
use crate::config::Config;
use crate::entities::SqliteStore;
use crate::mcp::{SessionRegistry, build_mcp_server};

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Users, notes and chats.
    pub store: Arc<SqliteStore>,
    pub jwt: Arc<JwtKeys>,
    /// Tool gateway shared by every MCP transport.
    pub mcp: Arc<McpServer>,
    /// Open SSE sessions, keyed by session ID.
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    /// Wire the store into the MCP tool set and assemble the shared state.
    pub fn build(config: Config, store: SqliteStore) -> Result<Self, ToolError> {
        let store = Arc::new(store);
        let mcp = build_mcp_server(&config, Arc::clone(&store))?;
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_secs);
        Ok(Self {
            config: Arc::new(config),
            store,
            jwt: Arc::new(jwt),
            mcp: Arc::new(mcp),
            sessions: Arc::new(SessionRegistry::new()),
        })
    }
}
