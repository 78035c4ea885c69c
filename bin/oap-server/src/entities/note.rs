use std::future::Future;

use chrono::Utc;
use uuid::Uuid;

use crate::entities::{SqliteStore, dao::Note, decode_ts, encode_ts};

pub trait NoteStore: Send + Sync + 'static {
    /// All notes, or only `user_id`'s, most recently updated first.
    fn list_notes(
        &self,
        user_id: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Note>, sqlx::Error>> + Send;
    fn get_note(&self, id: &str) -> impl Future<Output = Result<Option<Note>, sqlx::Error>> + Send;
    /// Insert a note; missing content is stored as `""`.
    fn create_note(
        &self,
        user_id: &str,
        title: &str,
        content: Option<&str>,
    ) -> impl Future<Output = Result<Note, sqlx::Error>> + Send;
    /// Apply the provided fields. `None` when the note does not exist.
    fn update_note(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> impl Future<Output = Result<Option<Note>, sqlx::Error>> + Send;
    fn delete_note(&self, id: &str) -> impl Future<Output = Result<Option<Note>, sqlx::Error>> + Send;
}

const COLUMNS: &str = "id, title, content, user_id, created_at, updated_at";

type NoteRow = (String, String, String, String, String, String);

fn from_row((id, title, content, user_id, created_at, updated_at): NoteRow) -> Note {
    Note {
        id,
        title,
        content,
        user_id,
        created_at: decode_ts(&created_at, "notes.created_at"),
        updated_at: decode_ts(&updated_at, "notes.updated_at"),
    }
}

impl NoteStore for SqliteStore {
    async fn list_notes(&self, user_id: Option<&str>) -> Result<Vec<Note>, sqlx::Error> {
        let rows: Vec<NoteRow> = if let Some(uid) = user_id {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM notes WHERE user_id = ?1 \
                 ORDER BY updated_at DESC, rowid DESC"
            ))
            .bind(uid)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM notes ORDER BY updated_at DESC, rowid DESC"
            ))
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows.into_iter().map(from_row).collect())
    }

    async fn get_note(&self, id: &str) -> Result<Option<Note>, sqlx::Error> {
        let row: Option<NoteRow> =
            sqlx::query_as(&format!("SELECT {COLUMNS} FROM notes WHERE id = ?1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(from_row))
    }

    async fn create_note(
        &self,
        user_id: &str,
        title: &str,
        content: Option<&str>,
    ) -> Result<Note, sqlx::Error> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: title.to_owned(),
            content: content.unwrap_or_default().to_owned(),
            user_id: user_id.to_owned(),
            created_at: now,
            updated_at: now,
        };
        sqlx::query(
            "INSERT INTO notes (id, title, content, user_id, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.user_id)
        .bind(encode_ts(&note.created_at))
        .bind(encode_ts(&note.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(note)
    }

    async fn update_note(
        &self,
        id: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Option<Note>, sqlx::Error> {
        let row: Option<NoteRow> = sqlx::query_as(&format!(
            "UPDATE notes SET title = COALESCE(?1, title), content = COALESCE(?2, content), \
             updated_at = ?3 WHERE id = ?4 RETURNING {COLUMNS}"
        ))
        .bind(title)
        .bind(content)
        .bind(encode_ts(&Utc::now()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn delete_note(&self, id: &str) -> Result<Option<Note>, sqlx::Error> {
        let row: Option<NoteRow> =
            sqlx::query_as(&format!("DELETE FROM notes WHERE id = ?1 RETURNING {COLUMNS}"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(from_row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::new_user;
    use crate::entities::{UserStore, memory_store};

    async fn store_with_user() -> (SqliteStore, String) {
        let store = memory_store().await;
        let user = new_user("notes@example.com");
        store.create_user(user.clone()).await.unwrap();
        (store, user.id)
    }

    #[tokio::test]
    async fn content_defaults_to_empty() {
        let (store, uid) = store_with_user().await;
        let note = store.create_note(&uid, "Groceries", None).await.unwrap();
        assert_eq!(note.content, "");
        let loaded = store.get_note(&note.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, "Groceries");
    }

    #[tokio::test]
    async fn list_is_newest_update_first_and_filters_by_user() {
        let (store, uid) = store_with_user().await;
        let other = new_user("other@example.com");
        store.create_user(other.clone()).await.unwrap();

        let first = store.create_note(&uid, "first", None).await.unwrap();
        let second = store.create_note(&uid, "second", None).await.unwrap();
        store.create_note(&other.id, "theirs", None).await.unwrap();

        let mine = store.list_notes(Some(&uid)).await.unwrap();
        let titles: Vec<_> = mine.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["second", "first"]);

        // Touching the older note moves it to the front.
        store.update_note(&first.id, None, Some("edited")).await.unwrap();
        let mine = store.list_notes(Some(&uid)).await.unwrap();
        assert_eq!(mine[0].id, first.id);
        assert_eq!(mine[1].id, second.id);

        assert_eq!(store.list_notes(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (store, uid) = store_with_user().await;
        let note = store.create_note(&uid, "title", Some("body")).await.unwrap();
        let updated = store
            .update_note(&note.id, Some("new title"), None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "new title");
        assert_eq!(updated.content, "body");
        assert!(updated.updated_at >= note.updated_at);
    }

    #[tokio::test]
    async fn update_and_delete_missing_return_none() {
        let (store, _) = store_with_user().await;
        assert!(store.update_note("missing", Some("x"), None).await.unwrap().is_none());
        assert!(store.delete_note("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_returns_removed_note() {
        let (store, uid) = store_with_user().await;
        let note = store.create_note(&uid, "bye", None).await.unwrap();
        let deleted = store.delete_note(&note.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, note.id);
        assert!(store.get_note(&note.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn note_requires_existing_user() {
        let store = memory_store().await;
        assert!(store.create_note("ghost", "t", None).await.is_err());
    }
}
