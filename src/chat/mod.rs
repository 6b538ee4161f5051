//! Session chat orchestration
//!
//! Answers user questions grounded in a previously analyzed session: the
//! question is embedded, ranked against the session's chunk index, and the
//! top passages (plus a trailing history window) are folded into the prompt.
//! Both turns of a successful exchange are appended to the store so the next
//! question sees them.

mod prompts;

pub use prompts::*;

use crate::config::ChatConfig;
use crate::embed::{rank_by_similarity, EmbeddingService};
use crate::error::{Error, Result};
use crate::insight::strip_code_fences;
use crate::llm::{generate_with_backoff, GenerativeModel, RetryPolicy};
use crate::session::{ConversationTurn, Role, SessionStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAX_FOLLOW_UPS: usize = 5;

/// A retrieved passage that grounded an answer
#[derive(Debug, Clone, Serialize)]
pub struct SourceSnippet {
    pub order_index: usize,
    pub text: String,
    pub score: f32,
}

/// A grounded chat answer with the passages it was built from
#[derive(Debug, Clone, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    pub sources: Vec<SourceSnippet>,
}

/// Runs retrieval-grounded chat over stored sessions
pub struct ConversationOrchestrator {
    store: Arc<dyn SessionStore>,
    embedder: Arc<dyn EmbeddingService>,
    model: Arc<dyn GenerativeModel>,
    config: ChatConfig,
    retry: RetryPolicy,
}

impl ConversationOrchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        embedder: Arc<dyn EmbeddingService>,
        model: Arc<dyn GenerativeModel>,
        config: ChatConfig,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            embedder,
            model,
            config,
            retry,
        }
    }

    /// Answer a question against a session.
    ///
    /// Fails with `SessionNotFound` for unknown ids and `Generation` when the
    /// model call ultimately fails; in the failure case no turns are appended.
    pub async fn answer(&self, session_id: Uuid, question: &str) -> Result<ChatAnswer> {
        let session = self
            .store
            .get(session_id)
            .await?
            .ok_or(Error::SessionNotFound(session_id))?;

        let chunks = self.store.chunks(session_id).await?;
        let history = self.store.history(session_id).await?;

        let sources = self.retrieve(&chunks, question).await;
        let context = if sources.is_empty() {
            debug!(session_id = %session_id, "No retrievable passages, answering from insight profile");
            insight_context(&session.insights)
        } else {
            sources
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n---\n")
        };

        let window = trailing_window(&history, self.config.max_history_turns);
        let prompt = chat_prompt(&session.page.url, &context, window, question);

        let answer = generate_with_backoff(self.model.as_ref(), &prompt, self.retry)
            .await
            .map_err(|e| Error::Generation(format!("model call failed: {}", e)))?;

        self.store
            .append_turn(session_id, ConversationTurn::now(Role::User, question))
            .await?;
        self.store
            .append_turn(session_id, ConversationTurn::now(Role::Assistant, answer.clone()))
            .await?;

        info!(
            session_id = %session_id,
            sources = sources.len(),
            "Answered chat question"
        );

        Ok(ChatAnswer { answer, sources })
    }

    /// Suggest follow-up questions for a session.
    ///
    /// Best-effort: malformed model output yields an empty list rather than
    /// an error.
    pub async fn suggest_follow_ups(&self, session_id: Uuid) -> Result<Vec<String>> {
        let session = self
            .store
            .get(session_id)
            .await?
            .ok_or(Error::SessionNotFound(session_id))?;

        let history = self.store.history(session_id).await?;
        let window = trailing_window(&history, self.config.max_history_turns);
        let context = insight_context(&session.insights);
        let prompt = follow_up_prompt(&session.page.url, &context, window);

        let raw = generate_with_backoff(self.model.as_ref(), &prompt, self.retry)
            .await
            .map_err(|e| Error::Generation(format!("model call failed: {}", e)))?;

        #[derive(Deserialize)]
        struct Suggestions {
            suggestions: Vec<String>,
        }

        match serde_json::from_str::<Suggestions>(strip_code_fences(&raw)) {
            Ok(mut parsed) => {
                parsed.suggestions.truncate(MAX_FOLLOW_UPS);
                Ok(parsed.suggestions)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Unparseable follow-up suggestions");
                Ok(Vec::new())
            }
        }
    }

    /// Rank session chunks against the question.
    ///
    /// Query-embedding failure degrades to no retrieval (the caller falls
    /// back to the insight profile) instead of failing the chat turn.
    async fn retrieve(
        &self,
        chunks: &[crate::index::ContentChunk],
        question: &str,
    ) -> Vec<SourceSnippet> {
        if chunks.is_empty() {
            return Vec::new();
        }

        let query = match self.embedder.embed(vec![question.to_string()]).await {
            Ok(mut vectors) if !vectors.is_empty() => vectors.remove(0),
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Query embedding failed, skipping retrieval");
                return Vec::new();
            }
        };

        let embeddings: Vec<Vec<f32>> = chunks.iter().map(|c| c.embedding.clone()).collect();
        rank_by_similarity(&query, &embeddings, self.config.top_k)
            .into_iter()
            .filter(|(_, score)| *score >= self.config.min_score)
            .map(|(i, score)| SourceSnippet {
                order_index: chunks[i].order_index,
                text: chunks[i].text.clone(),
                score,
            })
            .collect()
    }
}

fn trailing_window(history: &[ConversationTurn], max_turns: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(max_turns);
    &history[start..]
}
