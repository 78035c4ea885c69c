//! MCP transports over HTTP.
//!
//! - `GET /sse` opens an event stream. Its first event, `endpoint`, tells
//!   the client where to POST; responses come back as `message` events.
//! - `POST /messages?sessionId=…` feeds one JSON-RPC body into that session.
//! - `POST /mcp` is the stateless variant: the response is the HTTP body.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};
use utoipa::{IntoParams, OpenApi};

use crate::state::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(OpenApi)]
#[openapi(paths(sse_connect, post_message, streamable))]
pub struct McpApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sse", get(sse_connect))
        .route("/messages", post(post_message))
        .route("/mcp", post(streamable))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SessionQuery {
    /// ID announced in the `endpoint` event.
    pub session_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/sse",
    tag = "mcp",
    responses(
        (status = 200, description = "text/event-stream of MCP messages")
    )
)]
pub async fn sse_connect(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (guard, rx) = state.sessions.open();
    let endpoint = Event::default()
        .event("endpoint")
        .data(format!("/messages?sessionId={}", guard.id()));

    // The guard lives inside the stream, so the session ends with it.
    let messages = ReceiverStream::new(rx).map(move |message| {
        let _session = &guard;
        Ok(Event::default().event("message").data(message.to_string()))
    });

    Sse::new(stream::once(async move { Ok(endpoint) }).chain(messages))
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

#[utoipa::path(
    post,
    path = "/messages",
    tag = "mcp",
    params(SessionQuery),
    request_body = Value,
    responses(
        (status = 202, description = "Accepted; the response arrives on the event stream"),
        (status = 400, description = "Invalid session or unparseable body"),
    )
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "Invalid session").into_response();
    };
    let Some(tx) = state.sessions.sender(&session_id) else {
        debug!(%session_id, "message for unknown session");
        return (StatusCode::BAD_REQUEST, "Invalid session").into_response();
    };

    let message: Value = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(e) => {
            debug!(%session_id, error = %e, "unparseable message body");
            return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response();
        }
    };

    let mcp = Arc::clone(&state.mcp);
    tokio::spawn(async move {
        if let Some(response) = mcp.handle(message).await {
            if tx.send(response).await.is_err() {
                warn!(%session_id, "session closed before the response was delivered");
            }
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

#[utoipa::path(
    post,
    path = "/mcp",
    tag = "mcp",
    request_body = Value,
    responses(
        (status = 200, description = "JSON-RPC response", body = Value),
        (status = 202, description = "Notification accepted"),
    )
)]
pub async fn streamable(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.mcp.handle_text(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
