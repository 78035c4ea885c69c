//! Persistence layer.
//!
//! One store trait per entity ([`UserStore`], [`NoteStore`], [`ChatStore`]),
//! all implemented by [`SqliteStore`]. Handlers depend on the traits, so a
//! different backend only needs new impls.
//!
//! Trait methods use `impl Future` in their signatures, so no `async-trait`
//! is needed here.
//!
//! Timestamps are stored as RFC 3339 UTC strings with fixed microsecond
//! precision; string order is chronological order.

pub mod chat;
pub mod dao;
pub mod note;
pub mod user;

pub use chat::ChatStore;
pub use dao::{Chat, Message, Note, User};
pub use note::NoteStore;
pub use user::UserStore;

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the SQLite database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible SQLite URL, e.g. `"sqlite://oap.db"`
    /// or `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database lives and dies with its connection, so the
        // pool must hold exactly one and never recycle it.
        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };
        let pool = pool_options.connect_with(options).await?;

        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Round-trip a trivial query to confirm the database is reachable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }
}

pub(crate) fn encode_ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(raw: &str, field: &'static str) -> DateTime<Utc> {
    raw.parse().unwrap_or_else(|e: chrono::ParseError| {
        tracing::warn!(raw, field, error = %e, "failed to parse timestamp; using now");
        Utc::now()
    })
}

#[cfg(test)]
pub(crate) async fn memory_store() -> SqliteStore {
    SqliteStore::connect("sqlite::memory:").await.expect("in-memory store")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_sort_lexicographically() {
        let a: DateTime<Utc> = "2026-01-01T00:00:00.5Z".parse().unwrap();
        let b: DateTime<Utc> = "2026-01-01T00:00:00.25Z".parse().unwrap();
        // 0.5s > 0.25s, and the encoded strings must agree.
        assert!(encode_ts(&a) > encode_ts(&b));
    }

    #[test]
    fn timestamp_round_trip() {
        let now = Utc::now();
        let decoded = decode_ts(&encode_ts(&now), "t");
        assert_eq!(decoded.timestamp_micros(), now.timestamp_micros());
    }

    #[tokio::test]
    async fn migrations_run_on_memory_db() {
        memory_store().await;
    }
}
