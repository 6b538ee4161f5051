//! Insight extraction pipeline
//!
//! Prompts the generative model for a fixed-schema insight record, validates
//! the output, and retries once with a corrective instruction on malformed
//! output. Callers never see a partially-typed record: the result is either
//! a fully validated `InsightRecord` or `Error::Extraction`.

use super::{corrective_prompt, extraction_prompt, validate_output, InsightRecord, Validated};
use crate::config::ModelConfig;
use crate::error::{Error, Result};
use crate::llm::{generate_with_backoff, GenerativeModel, RetryPolicy};
use crate::resolve::ResolvedPage;
use std::sync::Arc;
use tracing::{info, warn};

/// Produces a structured business-insight record from resolved page text
pub struct InsightExtractor {
    model: Arc<dyn GenerativeModel>,
    retry: RetryPolicy,
    max_content_chars: usize,
}

impl InsightExtractor {
    pub fn new(model: Arc<dyn GenerativeModel>, config: &ModelConfig) -> Self {
        Self {
            model,
            retry: RetryPolicy::new(config.max_retries, config.initial_backoff_ms),
            max_content_chars: config.max_content_chars,
        }
    }

    /// Extract insights from a resolved page.
    pub async fn extract(&self, page: &ResolvedPage) -> Result<InsightRecord> {
        self.extract_with_questions(page, &[]).await
    }

    /// Extract insights, additionally answering caller-supplied questions.
    pub async fn extract_with_questions(
        &self,
        page: &ResolvedPage,
        custom_questions: &[String],
    ) -> Result<InsightRecord> {
        let prompt = extraction_prompt(&page.text, custom_questions, self.max_content_chars);

        let raw = generate_with_backoff(self.model.as_ref(), &prompt, self.retry)
            .await
            .map_err(|e| Error::Extraction(format!("model call failed: {}", e)))?;

        let reason = match validate_output(&raw) {
            Validated::Valid(record) => {
                info!(url = %page.url, confidence = record.confidence, "Extracted insights");
                return Ok(record);
            }
            Validated::Invalid(reason) => reason,
        };

        // One corrective regeneration for schema-invalid output, then fail.
        warn!(url = %page.url, reason = %reason, "Schema-invalid output, retrying with correction");
        let retry_prompt = corrective_prompt(&prompt, &reason);
        let raw = generate_with_backoff(self.model.as_ref(), &retry_prompt, self.retry)
            .await
            .map_err(|e| Error::Extraction(format!("corrective model call failed: {}", e)))?;

        match validate_output(&raw) {
            Validated::Valid(record) => {
                info!(url = %page.url, confidence = record.confidence, "Extracted insights after correction");
                Ok(record)
            }
            Validated::Invalid(reason) => Err(Error::Extraction(format!(
                "schema-invalid output after corrective retry: {}",
                reason
            ))),
        }
    }
}
