use chrono::{DateTime, Utc};

/// A row in the `notes` table.
#[derive(Debug, Clone)]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Empty string when the note was created without content.
    pub content: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
