//! Context indexing
//!
//! Splits resolved text into deterministic overlapping chunks and obtains an
//! embedding vector for each. Chunk embedding calls run with bounded
//! parallelism; a chunk whose embedding persistently fails is dropped from
//! the index (logged, not fatal) because partial context is strictly better
//! than none for chat quality.

use crate::chunk::chunk_text;
use crate::config::{ChunkConfig, EmbeddingConfig};
use crate::embed::EmbeddingService;
use crate::error::Result;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// A chunk of resolved text with its embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChunk {
    pub chunk_id: Uuid,
    pub session_id: Uuid,
    pub text: String,
    pub embedding: Vec<f32>,
    pub order_index: usize,
}

/// Builds the per-session retrieval index from resolved text
pub struct ContextIndexer {
    embedder: Arc<dyn EmbeddingService>,
    chunk_config: ChunkConfig,
    concurrency: usize,
}

impl ContextIndexer {
    pub fn new(
        embedder: Arc<dyn EmbeddingService>,
        chunk_config: ChunkConfig,
        embedding_config: &EmbeddingConfig,
    ) -> Self {
        Self {
            embedder,
            chunk_config,
            concurrency: embedding_config.concurrency.max(1),
        }
    }

    /// Index resolved text into an ordered sequence of embedded chunks.
    ///
    /// Chunk order is deterministic for identical input. Per-chunk embedding
    /// failures are retried once; a chunk that still fails is excluded.
    pub async fn index(&self, session_id: Uuid, text: &str) -> Result<Vec<ContentChunk>> {
        let chunks = chunk_text(text, &self.chunk_config);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        let total = chunks.len();

        let embedder = self.embedder.clone();
        let mut indexed: Vec<ContentChunk> = stream::iter(chunks)
            .map(|chunk| {
                let embedder = embedder.clone();
                async move {
                    match embed_with_retry(embedder.as_ref(), &chunk.text).await {
                        Some(embedding) => Some(ContentChunk {
                            chunk_id: Uuid::new_v4(),
                            session_id,
                            text: chunk.text,
                            embedding,
                            order_index: chunk.index,
                        }),
                        None => {
                            warn!(
                                session_id = %session_id,
                                order_index = chunk.index,
                                "Excluding chunk after repeated embedding failure"
                            );
                            None
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .filter_map(|chunk| async move { chunk })
            .collect()
            .await;

        indexed.sort_by_key(|chunk| chunk.order_index);

        if indexed.len() < total {
            warn!(
                session_id = %session_id,
                indexed = indexed.len(),
                total,
                "Partial index: some chunks excluded"
            );
        } else {
            info!(session_id = %session_id, chunks = indexed.len(), "Indexed session content");
        }

        Ok(indexed)
    }
}

async fn embed_with_retry(embedder: &dyn EmbeddingService, text: &str) -> Option<Vec<f32>> {
    for attempt in 0..2 {
        match embedder.embed(vec![text.to_string()]).await {
            Ok(mut vectors) if !vectors.is_empty() => return Some(vectors.remove(0)),
            Ok(_) => return None,
            Err(e) if attempt == 0 => {
                warn!(error = %e, "Chunk embedding failed, retrying once");
            }
            Err(_) => return None,
        }
    }
    None
}
