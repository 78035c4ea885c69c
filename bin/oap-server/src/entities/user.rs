use std::future::Future;

use crate::entities::{SqliteStore, decode_ts, dao::User, encode_ts};

pub trait UserStore: Send + Sync + 'static {
    fn create_user(&self, user: User) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_user(&self, id: &str) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, sqlx::Error>> + Send;
}

type UserRow = (String, String, Option<String>, String, String);

fn from_row((id, email, name, created_at, updated_at): UserRow) -> User {
    User {
        id,
        email,
        name,
        created_at: decode_ts(&created_at, "users.created_at"),
        updated_at: decode_ts(&updated_at, "users.updated_at"),
    }
}

impl UserStore for SqliteStore {
    async fn create_user(&self, user: User) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (id, email, name, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(encode_ts(&user.created_at))
        .bind(encode_ts(&user.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, created_at, updated_at FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, created_at, updated_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(from_row))
    }
}

#[cfg(test)]
pub(crate) fn new_user(email: &str) -> User {
    let now = chrono::Utc::now();
    User {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_owned(),
        name: None,
        created_at: now,
        updated_at: now,
    }
}
