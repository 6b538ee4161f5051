//! Session aggregate and storage interface
//!
//! A session ties one resolved page to its insight record, its chunk
//! embeddings, and a growing, append-only conversation history. The core
//! never caches session data across requests; the store is the single
//! owner and must provide read-after-write consistency per session id.

mod sqlite;

pub use sqlite::*;

use crate::error::{Error, Result};
use crate::index::ContentChunk;
use crate::insight::InsightRecord;
use crate::resolve::ResolvedPage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Speaker role in a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A single conversation turn, appended in strict chronological order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn now(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The aggregate created once per analysis request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub page: ResolvedPage,
    pub insights: InsightRecord,
    pub created_at: DateTime<Utc>,
}

/// Narrow persistence interface for sessions.
///
/// Implementations must guarantee read-after-write consistency per session
/// id: a chat call immediately following an analysis call for the same
/// session observes that analysis's chunks and insight.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new session with its chunk index
    async fn create(&self, session: &Session, chunks: &[ContentChunk]) -> Result<()>;

    /// Fetch a session by id
    async fn get(&self, session_id: Uuid) -> Result<Option<Session>>;

    /// Append a conversation turn; fails if the session is unknown
    async fn append_turn(&self, session_id: Uuid, turn: ConversationTurn) -> Result<()>;

    /// Conversation history in chronological order
    async fn history(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>>;

    /// Chunk index ordered by `order_index`
    async fn chunks(&self, session_id: Uuid) -> Result<Vec<ContentChunk>>;
}

#[derive(Debug, Clone)]
struct StoredSession {
    session: Session,
    chunks: Vec<ContentChunk>,
    turns: Vec<ConversationTurn>,
}

/// In-memory session store for tests and ephemeral use
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<HashMap<Uuid, StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &Session, chunks: &[ContentChunk]) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.insert(
            session.id,
            StoredSession {
                session: session.clone(),
                chunks: chunks.to_vec(),
                turns: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner.get(&session_id).map(|stored| stored.session.clone()))
    }

    async fn append_turn(&self, session_id: Uuid, turn: ConversationTurn) -> Result<()> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .get_mut(&session_id)
            .ok_or(Error::SessionNotFound(session_id))?;
        stored.turns.push(turn);
        Ok(())
    }

    async fn history(&self, session_id: Uuid) -> Result<Vec<ConversationTurn>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(&session_id)
            .map(|stored| stored.turns.clone())
            .unwrap_or_default())
    }

    async fn chunks(&self, session_id: Uuid) -> Result<Vec<ContentChunk>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(&session_id)
            .map(|stored| stored.chunks.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::insight::ContactInfo;
    use crate::resolve::ResolveMethod;

    pub(crate) fn sample_session() -> Session {
        Session {
            id: Uuid::new_v4(),
            page: ResolvedPage {
                url: "https://example.com/".to_string(),
                title: None,
                text: "Example content".to_string(),
                text_length: 15,
                method: ResolveMethod::Primary,
                fetched_at: Utc::now(),
            },
            insights: InsightRecord {
                industry: "SaaS".to_string(),
                company_size: "Startup".to_string(),
                location: "Remote".to_string(),
                usp: "Speed".to_string(),
                products_services: vec!["Platform".to_string()],
                target_audience: "Developers".to_string(),
                contact_info: ContactInfo::default(),
                confidence: 7,
                key_insights: Vec::new(),
                custom_answers: None,
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        let session = sample_session();

        store.create(&session, &[]).await.unwrap();

        let fetched = store.get(session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.insights.industry, "SaaS");
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_turns_preserve_order() {
        let store = MemorySessionStore::new();
        let session = sample_session();
        store.create(&session, &[]).await.unwrap();

        store
            .append_turn(session.id, ConversationTurn::now(Role::User, "first"))
            .await
            .unwrap();
        store
            .append_turn(session.id, ConversationTurn::now(Role::Assistant, "second"))
            .await
            .unwrap();

        let history = store.history(session.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "first");
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[1].content, "second");
    }

    #[tokio::test]
    async fn test_append_to_unknown_session_fails() {
        let store = MemorySessionStore::new();
        let err = store
            .append_turn(Uuid::new_v4(), ConversationTurn::now(Role::User, "q"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::SessionNotFound(_)));
    }
}
