use chrono::{DateTime, Utc};

/// A row in the `chats` table.
#[derive(Debug, Clone)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Bumped whenever a message is appended.
    pub updated_at: DateTime<Utc>,
}

/// A single row in the `messages` table.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    /// `"user"`, `"assistant"`, `"system"` or `"tool"`.
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
