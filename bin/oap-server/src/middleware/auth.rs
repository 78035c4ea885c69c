//! Bearer-token guard for user-scoped routes.
//!
//! On success the authenticated [`User`] is inserted into the request
//! extensions, where handlers pick it up with `Extension<User>`.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::bearer_token;
use crate::entities::{User, UserStore};
use crate::error::ServerError;
use crate::state::AppState;

pub async fn require_user(
    State(state): State<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_owned)
        .ok_or(ServerError::Unauthorized)?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        debug!(error = %e, "rejected bearer token");
        ServerError::Unauthorized
    })?;

    let user: User = state
        .store
        .get_user(&claims.sub)
        .await?
        .ok_or_else(|| {
            debug!(user_id = %claims.sub, "token subject has no user row");
            ServerError::Unauthorized
        })?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
