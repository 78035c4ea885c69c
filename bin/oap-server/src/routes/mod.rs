//! Axum router construction.
//!
//! [`build`] assembles the complete application router:
//! - CORS and per-request trace-ID layers
//! - Optional Swagger UI / OpenAPI document (`OAP_ENABLE_SWAGGER=false` disables it)
//! - `/health`
//! - `/api/notes` (bearer auth) and `/chats`
//! - MCP transports: `/sse`, `/messages`, `/mcp`

mod chats;
pub mod doc;
mod health;
mod mcp;
mod notes;

use axum::{Router, middleware};
use std::sync::Arc;
use tower::ServiceBuilder;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(notes::router(state.clone()))
        .merge(chats::router())
        .merge(mcp::router());

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(state.clone(), trace::trace_middleware))
        .with_state(state)
}
