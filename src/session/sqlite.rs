//! SQLite-backed session store
//!
//! Reference implementation of [`SessionStore`](super::SessionStore) for
//! deployments without an external store. Pages, insights, and embeddings
//! are stored as JSON columns; turn ordering rides on an autoincrement
//! rowid so history reads back in strict append order.

use super::{ConversationTurn, Role, Session, SessionStore};
use crate::error::{Error, Result};
use crate::index::ContentChunk;
use crate::insight::InsightRecord;
use crate::resolve::ResolvedPage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

/// SQL schema for the session database
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    page_json TEXT NOT NULL,
    insights_json TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS chunks (
    chunk_id TEXT PRIMARY KEY,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    order_index INTEGER NOT NULL,
    chunk_text TEXT NOT NULL,
    embedding_json TEXT NOT NULL,
    UNIQUE(session_id, order_index)
);

CREATE TABLE IF NOT EXISTS turns (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id TEXT NOT NULL REFERENCES sessions(id),
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_session ON chunks(session_id);
CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id);
"#;

/// SQLite session store handle
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Open (or create) the session database at the given path
    pub async fn open(path: &Path) -> Result<Self> {
        debug!("Opening session database at {}", path.display());

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(SCHEMA_SQL).execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn create(&self, session: &Session, chunks: &[ContentChunk]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO sessions (id, url, page_json, insights_json, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(session.id.to_string())
        .bind(&session.page.url)
        .bind(serde_json::to_string(&session.page)?)
        .bind(serde_json::to_string(&session.insights)?)
        .bind(session.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        for chunk in chunks {
            sqlx::query(
                "INSERT INTO chunks (chunk_id, session_id, order_index, chunk_text, embedding_json) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(chunk.chunk_id.to_string())
            .bind(chunk.session_id.to_string())
            .bind(chunk.order_index as i64)
            .bind(&chunk.text)
            .bind(serde_json::to_string(&chunk.embedding)?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query(
            "SELECT page_json, insights_json, created_at FROM sessions WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let page: ResolvedPage = serde_json::from_str(&row.try_get::<String, _>("page_json")?)?;
        let insights: InsightRecord =
            serde_json::from_str(&row.try_get::<String, _>("insights_json")?)?;
        let created_at = parse_timestamp(&row.try_get::<String, _>("created_at")?)?;

        Ok(Some(Session {
            id: session_id,
            page,
            insights,
            created_at,
        }))
    }

    async fn append_turn(&self, session_id: Uuid, turn: ConversationTurn) -> Result<()> {
        if self.get(session_id).await?.is_none() {
            return Err(Error::SessionNotFound(session_id));
        }

        sqlx::query(
            "INSERT INTO turns (session_id, role, content, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(session_id.to_string())
        .bind(turn.role.as_str())
        .bind(&turn.content)
        .bind(turn.timestamp.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn history(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>> {
        let rows = sqlx::query(
            "SELECT role, content, timestamp FROM turns WHERE session_id = ? ORDER BY seq ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let role = match row.try_get::<String, _>("role")?.as_str() {
                    "user" => Role::User,
                    "assistant" => Role::Assistant,
                    other => {
                        return Err(Error::Other(format!("unknown turn role '{}'", other)));
                    }
                };
                Ok(ConversationTurn {
                    role,
                    content: row.try_get::<String, _>("content")?,
                    timestamp: parse_timestamp(&row.try_get::<String, _>("timestamp")?)?,
                })
            })
            .collect()
    }

    async fn chunks(&self, session_id: Uuid) -> Result<Vec<ContentChunk>> {
        let rows = sqlx::query(
            "SELECT chunk_id, order_index, chunk_text, embedding_json \
             FROM chunks WHERE session_id = ? ORDER BY order_index ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let chunk_id = Uuid::from_str(&row.try_get::<String, _>("chunk_id")?)
                    .map_err(|e| Error::Other(format!("invalid chunk id: {}", e)))?;
                let embedding: Vec<f32> =
                    serde_json::from_str(&row.try_get::<String, _>("embedding_json")?)?;
                Ok(ContentChunk {
                    chunk_id,
                    session_id,
                    text: row.try_get::<String, _>("chunk_text")?,
                    embedding,
                    order_index: row.try_get::<i64, _>("order_index")? as usize,
                })
            })
            .collect()
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Other(format!("invalid timestamp '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::sample_session;
    use tempfile::TempDir;

    async fn open_store() -> (TempDir, SqliteSessionStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteSessionStore::open(&dir.path().join("sessions.db"))
            .await
            .unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let (_dir, store) = open_store().await;
        let session = sample_session();

        let chunks = vec![ContentChunk {
            chunk_id: Uuid::new_v4(),
            session_id: session.id,
            text: "Example content".to_string(),
            embedding: vec![0.1, 0.2, 0.3],
            order_index: 0,
        }];

        store.create(&session, &chunks).await.unwrap();

        let fetched = store.get(session.id).await.unwrap().unwrap();
        assert_eq!(fetched.page.url, session.page.url);
        assert_eq!(fetched.insights.confidence, 7);

        let stored_chunks = store.chunks(session.id).await.unwrap();
        assert_eq!(stored_chunks.len(), 1);
        assert_eq!(stored_chunks[0].embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_read_after_write_history() {
        let (_dir, store) = open_store().await;
        let session = sample_session();
        store.create(&session, &[]).await.unwrap();

        store
            .append_turn(session.id, ConversationTurn::now(Role::User, "question"))
            .await
            .unwrap();
        store
            .append_turn(session.id, ConversationTurn::now(Role::Assistant, "answer"))
            .await
            .unwrap();

        let history = store.history(session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let (_dir, store) = open_store().await;

        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
        assert!(matches!(
            store
                .append_turn(Uuid::new_v4(), ConversationTurn::now(Role::User, "q"))
                .await,
            Err(Error::SessionNotFound(_))
        ));
    }
}
