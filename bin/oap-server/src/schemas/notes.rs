use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::Note;
use crate::schemas::iso;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
    pub content: Option<String>,
}

/// Only the provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub user_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteListResponse {
    pub data: Vec<NoteResponse>,
}

/// `data` is `null` when the note does not exist or belongs to someone else.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptionalNoteResponse {
    pub data: Option<NoteResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteMutationResponse {
    pub data: NoteResponse,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageOnlyResponse {
    pub message: String,
}

impl Note {
    pub fn to_response(&self) -> NoteResponse {
        NoteResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            user_id: self.user_id.clone(),
            created_at: iso(&self.created_at),
            updated_at: iso(&self.updated_at),
        }
    }
}
