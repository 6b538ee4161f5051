//! Fallback reader service client
//!
//! Used only when the primary fetch path yields low-quality text, typically
//! for JavaScript-rendered pages. The HTTP implementation targets a
//! Jina-style reader API (`GET {base}/{url}` returning JSON).

use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Page content returned by a reader service
#[derive(Debug, Clone)]
pub struct ReaderPage {
    pub title: Option<String>,
    pub text: String,
}

/// Secondary content-extraction service used when the primary path fails
#[async_trait]
pub trait FallbackReader: Send + Sync {
    /// Fetch rendered page text for a URL
    async fn fetch(&self, url: &str) -> Result<ReaderPage>;
}

#[derive(Debug, Deserialize)]
struct ReaderResponse {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: String,
}

/// HTTP reader client (Jina-style API)
pub struct HttpReader {
    client: Client,
    base_url: String,
}

impl HttpReader {
    pub fn new(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| Error::Config(format!("invalid reader API key: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl FallbackReader for HttpReader {
    async fn fetch(&self, url: &str) -> Result<ReaderPage> {
        let api_url = format!("{}/{}", self.base_url, url);
        debug!("Fetching via fallback reader: {}", api_url);

        let response = self.client.get(&api_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Resolution {
                reason: format!("fallback reader returned HTTP {}", status),
            });
        }

        let body: ReaderResponse = response.json().await?;
        Ok(ReaderPage {
            title: body.title.filter(|t| !t.is_empty()),
            text: body.content,
        })
    }
}
