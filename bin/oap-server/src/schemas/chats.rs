use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::entities::{Chat, Message};
use crate::schemas::iso;

pub const MESSAGE_ROLES: [&str; 4] = ["user", "assistant", "system", "tool"];

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    #[validate(length(max = 200))]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChatRequest {
    #[validate(length(min = 1, max = 200, message = "title must be 1-200 characters"))]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    /// One of `user`, `assistant`, `system`, `tool`.
    #[validate(custom(function = "validate_role"))]
    pub role: String,
    pub content: String,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    if MESSAGE_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(ValidationError::new("role")
            .with_message("role must be one of user, assistant, system, tool".into()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatWithMessagesResponse {
    pub id: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    /// Oldest first.
    pub messages: Vec<MessageResponse>,
}

impl Chat {
    pub fn to_response(&self) -> ChatResponse {
        ChatResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: iso(&self.created_at),
            updated_at: iso(&self.updated_at),
        }
    }

    pub fn with_messages(&self, messages: &[Message]) -> ChatWithMessagesResponse {
        ChatWithMessagesResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: iso(&self.created_at),
            updated_at: iso(&self.updated_at),
            messages: messages.iter().map(Message::to_response).collect(),
        }
    }
}

impl Message {
    pub fn to_response(&self) -> MessageResponse {
        MessageResponse {
            id: self.id.clone(),
            chat_id: self.chat_id.clone(),
            role: self.role.clone(),
            content: self.content.clone(),
            created_at: iso(&self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_pass() {
        for role in MESSAGE_ROLES {
            let req = AddMessageRequest { role: role.into(), content: "x".into() };
            assert!(req.validate().is_ok(), "{role}");
        }
    }

    #[test]
    fn unknown_role_fails() {
        let req = AddMessageRequest { role: "robot".into(), content: "x".into() };
        let err = req.validate().unwrap_err();
        assert!(err.field_errors().contains_key("role"));
    }

    #[test]
    fn response_is_camel_case() {
        let now = chrono::Utc::now();
        let chat = Chat { id: "c".into(), title: "t".into(), created_at: now, updated_at: now };
        let value = serde_json::to_value(chat.with_messages(&[])).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert_eq!(value["messages"], serde_json::json!([]));
    }
}
