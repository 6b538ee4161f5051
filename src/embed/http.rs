//! Gemini embedding backend (batchEmbedContents REST API)

use super::{validate_dimensions, EmbeddingService};
use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// HTTP embedding client for the Gemini embedContent API
pub struct GeminiEmbedder {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
    dimension: usize,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

impl GeminiEmbedder {
    pub fn new(
        config: &EmbeddingConfig,
        api_base: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl EmbeddingService for GeminiEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/v1beta/models/{}:batchEmbedContents?key={}",
            self.api_base, self.model, self.api_key
        );

        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| {
                    json!({
                        "model": format!("models/{}", self.model),
                        "content": { "parts": [{ "text": text }] },
                        "taskType": "RETRIEVAL_DOCUMENT",
                    })
                })
                .collect(),
        };

        debug!(count = texts.len(), model = %self.model, "Requesting embeddings");

        let response = self.client.post(&url).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Embedding(format!(
                "embedding API returned HTTP {}: {}",
                status, body
            )));
        }

        let body: BatchEmbedResponse = response.json().await?;
        if body.embeddings.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "embedding API returned {} vectors for {} inputs",
                body.embeddings.len(),
                texts.len()
            )));
        }

        let embeddings: Vec<Vec<f32>> = body.embeddings.into_iter().map(|e| e.values).collect();
        validate_dimensions(&embeddings, self.dimension)?;
        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
