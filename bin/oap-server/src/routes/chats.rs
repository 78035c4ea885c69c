//! `/chats`: chat threads and their messages. No authentication.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use utoipa::OpenApi;
use validator::Validate;

use crate::entities::{Chat, ChatStore};
use crate::error::ServerError;
use crate::schemas::chats::{
    AddMessageRequest, ChatResponse, ChatWithMessagesResponse, CreateChatRequest,
    MessageResponse, UpdateChatRequest,
};
use crate::state::AppState;

/// Maximum number of chats returned by `GET /chats`.
const CHAT_LIST_LIMIT: i64 = 50;

#[derive(OpenApi)]
#[openapi(
    paths(create_chat, list_chats, get_chat, add_message, update_chat, delete_chat),
    components(schemas(
        CreateChatRequest,
        UpdateChatRequest,
        AddMessageRequest,
        ChatResponse,
        ChatWithMessagesResponse,
        MessageResponse
    ))
)]
pub struct ChatsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chats", post(create_chat).get(list_chats))
        .route("/chats/{id}", get(get_chat).patch(update_chat).delete(delete_chat))
        .route("/chats/{id}/messages", post(add_message))
}

fn not_found(id: &str) -> ServerError {
    ServerError::NotFound(format!("Chat with ID {id} not found"))
}

#[utoipa::path(
    post,
    path = "/chats",
    tag = "chats",
    request_body = CreateChatRequest,
    responses(
        (status = 200, description = "Chat created", body = ChatResponse),
        (status = 400, description = "Bad request"),
    )
)]
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Option<Json<CreateChatRequest>>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    // A request without a JSON body creates an untitled chat.
    let req = payload?.map(|Json(req)| req).unwrap_or_default();
    req.validate()?;
    let chat = state.store.create_chat(req.title.as_deref()).await?;
    Ok(Json(chat.to_response()))
}

#[utoipa::path(
    get,
    path = "/chats",
    tag = "chats",
    responses(
        (status = 200, description = "Most recently active chats", body = Vec<ChatResponse>),
    )
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ChatResponse>>, ServerError> {
    let chats = state.store.list_chats(CHAT_LIST_LIMIT).await?;
    Ok(Json(chats.iter().map(Chat::to_response).collect()))
}

#[utoipa::path(
    get,
    path = "/chats/{id}",
    tag = "chats",
    params(("id" = String, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat with its messages", body = ChatWithMessagesResponse),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn get_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChatWithMessagesResponse>, ServerError> {
    let chat = state.store.get_chat(&id).await?.ok_or_else(|| not_found(&id))?;
    let messages = state.store.list_messages(&id).await?;
    Ok(Json(chat.with_messages(&messages)))
}

#[utoipa::path(
    post,
    path = "/chats/{id}/messages",
    tag = "chats",
    params(("id" = String, Path, description = "Chat ID")),
    request_body = AddMessageRequest,
    responses(
        (status = 200, description = "Message appended", body = MessageResponse),
        (status = 400, description = "Unknown role"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn add_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<AddMessageRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ServerError> {
    let Json(req) = payload?;
    req.validate()?;
    let message = state
        .store
        .add_message(&id, &req.role, &req.content)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(message.to_response()))
}

#[utoipa::path(
    patch,
    path = "/chats/{id}",
    tag = "chats",
    params(("id" = String, Path, description = "Chat ID")),
    request_body = UpdateChatRequest,
    responses(
        (status = 200, description = "Chat renamed", body = ChatResponse),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn update_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(req) = payload?;
    req.validate()?;
    let chat = state
        .store
        .update_chat_title(&id, &req.title)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(chat.to_response()))
}

#[utoipa::path(
    delete,
    path = "/chats/{id}",
    tag = "chats",
    params(("id" = String, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "The deleted chat", body = ChatResponse),
        (status = 404, description = "Chat not found"),
    )
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChatResponse>, ServerError> {
    let chat = state.store.delete_chat(&id).await?.ok_or_else(|| not_found(&id))?;
    Ok(Json(chat.to_response()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{TestApp, request};

    #[tokio::test]
    async fn chat_lifecycle() {
        let app = TestApp::new().await;

        let (status, chat) = app.send(request(Method::POST, "/chats", None, Some(json!({})))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chat["title"], "New Chat");
        let id = chat["id"].as_str().unwrap().to_owned();

        for (role, content) in [("user", "hello"), ("assistant", "hi there")] {
            let (status, message) = app
                .send(request(
                    Method::POST,
                    &format!("/chats/{id}/messages"),
                    None,
                    Some(json!({"role": role, "content": content})),
                ))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(message["chatId"], id.as_str());
        }

        let (status, full) = app.send(request(Method::GET, &format!("/chats/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let contents: Vec<_> = full["messages"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(contents, ["hello", "hi there"]);

        let (_, renamed) = app
            .send(request(
                Method::PATCH,
                &format!("/chats/{id}"),
                None,
                Some(json!({"title": "Greetings"})),
            ))
            .await;
        assert_eq!(renamed["title"], "Greetings");

        let (status, deleted) = app.send(request(Method::DELETE, &format!("/chats/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["id"], id.as_str());

        let (status, body) = app.send(request(Method::GET, &format!("/chats/{id}"), None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], format!("Chat with ID {id} not found"));
    }

    #[tokio::test]
    async fn bodyless_create_uses_default_title() {
        let app = TestApp::new().await;
        let (status, chat) = app.send(request(Method::POST, "/chats", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(chat["title"], "New Chat");
    }

    #[tokio::test]
    async fn malformed_message_body_is_400_json() {
        let app = TestApp::new().await;
        let (_, chat) = app.send(request(Method::POST, "/chats", None, None)).await;
        let (status, body) = app
            .send(request(
                Method::POST,
                &format!("/chats/{}/messages", chat["id"].as_str().unwrap()),
                None,
                Some(json!({"role": "user"})),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("content"), "{body}");
    }

    #[tokio::test]
    async fn message_to_missing_chat_is_404() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(request(
                Method::POST,
                "/chats/missing/messages",
                None,
                Some(json!({"role": "user", "content": "x"})),
            ))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_role_is_400() {
        let app = TestApp::new().await;
        let (_, chat) = app.send(request(Method::POST, "/chats", None, Some(json!({})))).await;
        let (status, _) = app
            .send(request(
                Method::POST,
                &format!("/chats/{}/messages", chat["id"].as_str().unwrap()),
                None,
                Some(json!({"role": "wizard", "content": "x"})),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_is_most_recently_active_first() {
        let app = TestApp::new().await;
        let (_, first) = app
            .send(request(Method::POST, "/chats", None, Some(json!({"title": "first"}))))
            .await;
        app.send(request(Method::POST, "/chats", None, Some(json!({"title": "second"}))))
            .await;
        app.send(request(
            Method::POST,
            &format!("/chats/{}/messages", first["id"].as_str().unwrap()),
            None,
            Some(json!({"role": "user", "content": "bump"})),
        ))
        .await;

        let (status, list) = app.send(request(Method::GET, "/chats", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> = list.as_array().unwrap().iter().map(|c| c["title"].as_str().unwrap()).collect();
        assert_eq!(titles, ["first", "second"]);
    }
}
