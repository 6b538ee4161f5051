//! End-to-end website analysis
//!
//! Wires resolution, insight extraction, context indexing, and session
//! creation into the single operation that produces a chat-ready session.
//! Extraction and indexing both consume the same resolved text and run
//! concurrently; the session is persisted only after both succeed.

use crate::error::Result;
use crate::index::ContextIndexer;
use crate::insight::{InsightExtractor, InsightRecord};
use crate::resolve::{ContentResolver, ResolveMethod};
use crate::session::{Session, SessionStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Result of a completed analysis, keyed by the new session id
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub session_id: Uuid,
    pub insights: InsightRecord,
    pub resolved_at: DateTime<Utc>,
    pub method: ResolveMethod,
    pub chunk_count: usize,
}

/// Runs the full URL-to-session pipeline
pub struct Analyzer {
    resolver: ContentResolver,
    extractor: InsightExtractor,
    indexer: ContextIndexer,
    store: Arc<dyn SessionStore>,
}

impl Analyzer {
    pub fn new(
        resolver: ContentResolver,
        extractor: InsightExtractor,
        indexer: ContextIndexer,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            resolver,
            extractor,
            indexer,
            store,
        }
    }

    /// Analyze a URL and persist the resulting session.
    ///
    /// Any stage failure aborts the whole operation; nothing is stored and
    /// the stage's typed error is returned unchanged.
    pub async fn analyze(&self, url: &str, custom_questions: &[String]) -> Result<AnalysisOutcome> {
        let page = self.resolver.resolve(url).await?;
        let session_id = Uuid::new_v4();

        let (insights, chunks) = tokio::try_join!(
            self.extractor.extract_with_questions(&page, custom_questions),
            self.indexer.index(session_id, &page.text),
        )?;

        let resolved_at = page.fetched_at;
        let method = page.method;
        let session = Session {
            id: session_id,
            page,
            insights: insights.clone(),
            created_at: Utc::now(),
        };
        self.store.create(&session, &chunks).await?;

        info!(
            session_id = %session_id,
            url = %session.page.url,
            method = method.as_str(),
            chunks = chunks.len(),
            "Analysis complete"
        );

        Ok(AnalysisOutcome {
            session_id,
            insights,
            resolved_at,
            method,
            chunk_count: chunks.len(),
        })
    }
}
