//! Generative model abstraction
//!
//! A narrow trait over the generative model service plus a bounded
//! exponential-backoff retry helper shared by insight extraction and chat
//! answer generation.

mod http;

pub use http::*;

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Trait for generative model providers
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate a completion for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Retry policy for transient upstream model errors
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, 250)
    }
}

/// Generate with bounded exponential backoff.
///
/// Retries any model error up to `max_retries` times, doubling the delay
/// each attempt, then surfaces the last error.
pub async fn generate_with_backoff(
    model: &dyn GenerativeModel,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String> {
    let mut delay = policy.initial_backoff;
    let mut attempt = 0;

    loop {
        match model.generate(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                warn!(attempt, error = %e, "Model call failed, retrying after {:?}", delay);
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}
