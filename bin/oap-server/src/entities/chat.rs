use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use crate::entities::{
    SqliteStore,
    dao::{Chat, Message},
    decode_ts, encode_ts,
};

/// Title given to chats created without one.
pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

pub trait ChatStore: Send + Sync + 'static {
    fn create_chat(&self, title: Option<&str>) -> impl Future<Output = Result<Chat, sqlx::Error>> + Send;
    /// Most recently updated first.
    fn list_chats(&self, limit: i64) -> impl Future<Output = Result<Vec<Chat>, sqlx::Error>> + Send;
    fn get_chat(&self, id: &str) -> impl Future<Output = Result<Option<Chat>, sqlx::Error>> + Send;
    /// Oldest first.
    fn list_messages(
        &self,
        chat_id: &str,
    ) -> impl Future<Output = Result<Vec<Message>, sqlx::Error>> + Send;
    /// Append a message and bump the chat's `updated_at` atomically.
    /// `None` when the chat does not exist.
    fn add_message(
        &self,
        chat_id: &str,
        role: &str,
        content: &str,
    ) -> impl Future<Output = Result<Option<Message>, sqlx::Error>> + Send;
    fn update_chat_title(
        &self,
        id: &str,
        title: &str,
    ) -> impl Future<Output = Result<Option<Chat>, sqlx::Error>> + Send;
    /// Deletes the chat and, by cascade, its messages.
    fn delete_chat(&self, id: &str) -> impl Future<Output = Result<Option<Chat>, sqlx::Error>> + Send;
}

type ChatRow = (String, String, String, String);
type MessageRow = (String, String, String, String, String);

fn chat_from_row((id, title, created_at, updated_at): ChatRow) -> Chat {
    Chat {
        id,
        title,
        created_at: decode_ts(&created_at, "chats.created_at"),
        updated_at: decode_ts(&updated_at, "chats.updated_at"),
    }
}

fn message_from_row((id, chat_id, role, content, created_at): MessageRow) -> Message {
    Message {
        id,
        chat_id,
        role,
        content,
        created_at: decode_ts(&created_at, "messages.created_at"),
    }
}

impl ChatStore for SqliteStore {
    async fn create_chat(&self, title: Option<&str>) -> Result<Chat, sqlx::Error> {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4().to_string(),
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_CHAT_TITLE)
                .to_owned(),
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO chats (id, title, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&chat.id)
        .bind(&chat.title)
        .bind(encode_ts(&chat.created_at))
        .bind(encode_ts(&chat.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(chat)
    }

    async fn list_chats(&self, limit: i64) -> Result<Vec<Chat>, sqlx::Error> {
        let rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT id, title, created_at, updated_at FROM chats \
             ORDER BY updated_at DESC, rowid DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(chat_from_row).collect())
    }

    async fn get_chat(&self, id: &str) -> Result<Option<Chat>, sqlx::Error> {
        let row: Option<ChatRow> =
            sqlx::query_as("SELECT id, title, created_at, updated_at FROM chats WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(chat_from_row))
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, chat_id, role, content, created_at FROM messages \
             WHERE chat_id = ?1 ORDER BY created_at ASC, rowid ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(message_from_row).collect())
    }

    async fn add_message(
        &self,
        chat_id: &str,
        role: &str,
        content: &str,
    ) -> Result<Option<Message>, sqlx::Error> {
        let now = Utc::now();
        let created_at = encode_ts(&now);
        let mut tx = self.pool.begin().await?;

        let touched = sqlx::query("UPDATE chats SET updated_at = ?1 WHERE id = ?2")
            .bind(&created_at)
            .bind(chat_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if touched == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let message = Message {
            id: Uuid::new_v4().to_string(),
            chat_id: chat_id.to_owned(),
            role: role.to_owned(),
            content: content.to_owned(),
            created_at: now,
        };
        sqlx::query(
            "INSERT INTO messages (id, chat_id, role, content, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&message.id)
        .bind(&message.chat_id)
        .bind(&message.role)
        .bind(&message.content)
        .bind(&created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(message))
    }

    async fn update_chat_title(&self, id: &str, title: &str) -> Result<Option<Chat>, sqlx::Error> {
        let row: Option<ChatRow> = sqlx::query_as(
            "UPDATE chats SET title = ?1, updated_at = ?2 WHERE id = ?3 \
             RETURNING id, title, created_at, updated_at",
        )
        .bind(title)
        .bind(encode_ts(&Utc::now()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(chat_from_row))
    }

    async fn delete_chat(&self, id: &str) -> Result<Option<Chat>, sqlx::Error> {
        let row: Option<ChatRow> = sqlx::query_as(
            "DELETE FROM chats WHERE id = ?1 RETURNING id, title, created_at, updated_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(chat_from_row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::memory_store;

    #[tokio::test]
    async fn default_title() {
        let store = memory_store().await;
        assert_eq!(store.create_chat(None).await.unwrap().title, "New Chat");
        assert_eq!(store.create_chat(Some("")).await.unwrap().title, "New Chat");
        assert_eq!(store.create_chat(Some("Trip")).await.unwrap().title, "Trip");
    }

    #[tokio::test]
    async fn adding_a_message_bumps_the_chat() {
        let store = memory_store().await;
        let older = store.create_chat(Some("older")).await.unwrap();
        let newer = store.create_chat(Some("newer")).await.unwrap();
        assert_eq!(store.list_chats(50).await.unwrap()[0].id, newer.id);

        store.add_message(&older.id, "user", "hi").await.unwrap().unwrap();
        let chats = store.list_chats(50).await.unwrap();
        assert_eq!(chats[0].id, older.id);
        assert!(chats[0].updated_at >= older.updated_at);
    }

    #[tokio::test]
    async fn messages_are_oldest_first() {
        let store = memory_store().await;
        let chat = store.create_chat(None).await.unwrap();
        for (role, content) in [("user", "q1"), ("assistant", "a1"), ("user", "q2")] {
            store.add_message(&chat.id, role, content).await.unwrap();
        }
        let contents: Vec<_> = store
            .list_messages(&chat.id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, ["q1", "a1", "q2"]);
    }

    #[tokio::test]
    async fn message_to_missing_chat_is_none() {
        let store = memory_store().await;
        assert!(store.add_message("missing", "user", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_respects_limit() {
        let store = memory_store().await;
        for _ in 0..3 {
            store.create_chat(None).await.unwrap();
        }
        assert_eq!(store.list_chats(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_cascades_to_messages() {
        let store = memory_store().await;
        let chat = store.create_chat(None).await.unwrap();
        store.add_message(&chat.id, "user", "x").await.unwrap();
        let deleted = store.delete_chat(&chat.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, chat.id);
        assert!(store.get_chat(&chat.id).await.unwrap().is_none());
        assert!(store.list_messages(&chat.id).await.unwrap().is_empty());
        assert!(store.delete_chat(&chat.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename() {
        let store = memory_store().await;
        let chat = store.create_chat(None).await.unwrap();
        let renamed = store.update_chat_title(&chat.id, "Renamed").await.unwrap().unwrap();
        assert_eq!(renamed.title, "Renamed");
        assert!(store.update_chat_title("missing", "x").await.unwrap().is_none());
    }
}
