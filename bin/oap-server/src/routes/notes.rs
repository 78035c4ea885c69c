//! `/api/notes`: the caller's own notes. Every route requires a bearer token.
//!
//! A note owned by someone else behaves exactly like a missing one.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use utoipa::OpenApi;
use validator::Validate;

use crate::entities::{Note, NoteStore, User};
use crate::error::ServerError;
use crate::middleware::auth::require_user;
use crate::schemas::notes::{
    CreateNoteRequest, MessageOnlyResponse, NoteListResponse, NoteMutationResponse, NoteResponse,
    OptionalNoteResponse, UpdateNoteRequest,
};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(list_notes, get_note, create_note, update_note, delete_note),
    components(schemas(
        CreateNoteRequest,
        UpdateNoteRequest,
        NoteResponse,
        NoteListResponse,
        OptionalNoteResponse,
        NoteMutationResponse,
        MessageOnlyResponse
    ))
)]
pub struct NotesApi;

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", get(get_note).patch(update_note).delete(delete_note))
        .route_layer(middleware::from_fn_with_state(state, require_user))
}

/// Load a note only if `user` owns it.
async fn owned_note(state: &AppState, user: &User, id: &str) -> Result<Option<Note>, ServerError> {
    let note = state.store.get_note(id).await?;
    Ok(note.filter(|n| n.user_id == user.id))
}

fn not_found(id: &str) -> ServerError {
    ServerError::NotFound(format!("Note with ID {id} not found"))
}

#[utoipa::path(
    get,
    path = "/api/notes",
    tag = "notes",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The caller's notes, newest first", body = NoteListResponse),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn list_notes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<NoteListResponse>, ServerError> {
    let notes = state.store.list_notes(Some(&user.id)).await?;
    Ok(Json(NoteListResponse { data: notes.iter().map(Note::to_response).collect() }))
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    tag = "notes",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "The note, or null", body = OptionalNoteResponse),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn get_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<OptionalNoteResponse>, ServerError> {
    let note = owned_note(&state, &user, &id).await?;
    Ok(Json(OptionalNoteResponse { data: note.as_ref().map(Note::to_response) }))
}

#[utoipa::path(
    post,
    path = "/api/notes",
    tag = "notes",
    security(("bearer" = [])),
    request_body = CreateNoteRequest,
    responses(
        (status = 200, description = "Note created", body = NoteMutationResponse),
        (status = 400, description = "Invalid title"),
        (status = 401, description = "Missing or invalid token"),
    )
)]
pub async fn create_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteMutationResponse>, ServerError> {
    let Json(req) = payload?;
    req.validate()?;
    let note = state
        .store
        .create_note(&user.id, &req.title, req.content.as_deref())
        .await?;
    Ok(Json(NoteMutationResponse {
        data: note.to_response(),
        message: "Note created successfully".into(),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/notes/{id}",
    tag = "notes",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated", body = NoteMutationResponse),
        (status = 400, description = "Invalid title"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Note not found"),
    )
)]
pub async fn update_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteMutationResponse>, ServerError> {
    let Json(req) = payload?;
    req.validate()?;
    if owned_note(&state, &user, &id).await?.is_none() {
        return Err(not_found(&id));
    }
    let note = state
        .store
        .update_note(&id, req.title.as_deref(), req.content.as_deref())
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(NoteMutationResponse { data: note.to_response(), message: "Note updated".into() }))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    tag = "notes",
    security(("bearer" = [])),
    params(("id" = String, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Note deleted", body = MessageOnlyResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Note not found"),
    )
)]
pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<MessageOnlyResponse>, ServerError> {
    if owned_note(&state, &user, &id).await?.is_none() {
        return Err(not_found(&id));
    }
    state.store.delete_note(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(MessageOnlyResponse { message: "Note deleted".into() }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{TestApp, request};

    #[tokio::test]
    async fn requires_a_valid_token() {
        let app = TestApp::new().await;
        let (status, body) = app.send(request(Method::GET, "/api/notes", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, _) = app
            .send(request(Method::GET, "/api/notes", Some("not-a-jwt"), None))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_rejected() {
        let app = TestApp::new().await;
        let token = app.state.jwt.issue("no-such-user").unwrap();
        let (status, _) = app.send(request(Method::GET, "/api/notes", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_then_list() {
        let app = TestApp::new().await;
        let token = app.token_for("writer@example.com").await;

        let (status, body) = app
            .send(request(
                Method::POST,
                "/api/notes",
                Some(&token),
                Some(json!({"title": "Groceries"})),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Note created successfully");
        assert_eq!(body["data"]["content"], "");
        assert!(body["data"]["userId"].is_string());
        assert!(body["data"]["createdAt"].is_string());

        let (_, body) = app.send(request(Method::GET, "/api/notes", Some(&token), None)).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["title"], "Groceries");
    }

    #[tokio::test]
    async fn invalid_title_is_400() {
        let app = TestApp::new().await;
        let token = app.token_for("v@example.com").await;
        let (status, body) = app
            .send(request(Method::POST, "/api/notes", Some(&token), Some(json!({"title": ""}))))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn missing_or_broken_body_is_400_json() {
        let app = TestApp::new().await;
        let token = app.token_for("b@example.com").await;

        let (status, body) = app.send(request(Method::POST, "/api/notes", Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");

        let broken = axum::http::Request::post("/api/notes")
            .header(axum::http::header::AUTHORIZATION, format!("Bearer {token}"))
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from("{\"title\": "))
            .unwrap();
        let (status, body) = app.send(broken).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string(), "{body}");
    }

    #[tokio::test]
    async fn other_users_notes_are_invisible() {
        let app = TestApp::new().await;
        let owner = app.token_for("owner@example.com").await;
        let intruder = app.token_for("intruder@example.com").await;

        let (_, created) = app
            .send(request(
                Method::POST,
                "/api/notes",
                Some(&owner),
                Some(json!({"title": "private", "content": "secret"})),
            ))
            .await;
        let uri = format!("/api/notes/{}", created["data"]["id"].as_str().unwrap());

        let (status, body) = app.send(request(Method::GET, &uri, Some(&intruder), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].is_null());

        let (status, _) = app
            .send(request(Method::PATCH, &uri, Some(&intruder), Some(json!({"title": "mine"}))))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = app.send(request(Method::DELETE, &uri, Some(&intruder), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = app.send(request(Method::GET, "/api/notes", Some(&intruder), None)).await;
        assert_eq!(body["data"], json!([]));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let app = TestApp::new().await;
        let token = app.token_for("editor@example.com").await;
        let (_, created) = app
            .send(request(
                Method::POST,
                "/api/notes",
                Some(&token),
                Some(json!({"title": "draft", "content": "v1"})),
            ))
            .await;
        let uri = format!("/api/notes/{}", created["data"]["id"].as_str().unwrap());

        let (status, body) = app
            .send(request(Method::PATCH, &uri, Some(&token), Some(json!({"content": "v2"}))))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Note updated");
        assert_eq!(body["data"]["title"], "draft");
        assert_eq!(body["data"]["content"], "v2");

        let (status, body) = app.send(request(Method::DELETE, &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Note deleted");

        let (status, _) = app.send(request(Method::DELETE, &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (_, body) = app.send(request(Method::GET, &uri, Some(&token), None)).await;
        assert!(body["data"].is_null());
    }
}
