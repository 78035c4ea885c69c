use thiserror::Error;

/// Failure talking to the OAP API (or the OCR service).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream url '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to call OAP API: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with no body at all.
    #[error("Failed to call OAP API: {endpoint} returned an empty body (status {status})")]
    EmptyBody { endpoint: String, status: u16 },

    /// The upstream answered, but not with JSON.
    #[error("Failed to call OAP API: {endpoint} returned non-JSON body (status {status})")]
    NonJson { endpoint: String, status: u16 },
}

/// Errors raised while executing a tool.
///
/// These never cross the protocol boundary as JSON-RPC errors; the catalog
/// folds them into an error [`ToolResult`](crate::ToolResult).
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Internal(String),
}
