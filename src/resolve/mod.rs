//! Content resolution
//!
//! Turns a URL into a clean textual representation of the page. The primary
//! lightweight fetch-and-clean path runs first; if its output fails quality
//! scoring (or the fetch fails outright) and a fallback reader is
//! configured, the fallback is tried exactly once. Nothing is persisted on
//! failure.

mod reader;

pub use reader::*;

use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::parse::{clean_html, normalize_whitespace};
use crate::quality::QualityClassifier;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Which resolution path produced the page text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveMethod {
    Primary,
    Fallback,
}

impl ResolveMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolveMethod::Primary => "primary",
            ResolveMethod::Fallback => "fallback",
        }
    }
}

/// Clean, accepted page text. Immutable once created; owned by the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPage {
    pub url: String,
    pub title: Option<String>,
    pub text: String,
    pub text_length: usize,
    pub method: ResolveMethod,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches and cleans page text, deciding primary vs. fallback path
pub struct ContentResolver {
    client: Client,
    quality: QualityClassifier,
    fallback: Option<Arc<dyn FallbackReader>>,
    min_fallback_text_length: usize,
}

impl ContentResolver {
    pub fn new(
        config: &ResolverConfig,
        quality: QualityClassifier,
        fallback: Option<Arc<dyn FallbackReader>>,
        min_fallback_text_length: usize,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            quality,
            fallback,
            min_fallback_text_length,
        })
    }

    /// Resolve a URL to clean page text, or fail with a typed reason.
    pub async fn resolve(&self, url: &str) -> Result<ResolvedPage> {
        let url = validate_url(url)?;

        let rejection = match self.fetch_primary(&url).await {
            Ok(html) => {
                let cleaned = clean_html(&html);
                let report = self.quality.score(&html, &cleaned.text);
                if report.accept {
                    info!(
                        url = %url,
                        text_length = report.metrics.text_length,
                        "Primary resolution accepted"
                    );
                    return Ok(ResolvedPage {
                        url: url.to_string(),
                        title: cleaned.title,
                        text_length: cleaned.text.len(),
                        text: cleaned.text,
                        method: ResolveMethod::Primary,
                        fetched_at: Utc::now(),
                    });
                }
                debug!(url = %url, reason = %report.reason, "Primary content rejected");
                format!("quality check failed: {}", report.reason)
            }
            Err(reason) => {
                warn!(url = %url, reason = %reason, "Primary fetch failed");
                format!("primary fetch failed: {}", reason)
            }
        };

        // Fallback is attempted exactly once, and only when configured.
        let Some(fallback) = &self.fallback else {
            return Err(Error::Resolution { reason: rejection });
        };

        info!(url = %url, "Retrying through fallback reader");
        let page = match fallback.fetch(url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                return Err(Error::Resolution {
                    reason: format!("fallback reader failed: {}", e),
                });
            }
        };
        let text = normalize_whitespace(&page.text);

        // Reader output is markdown, so ratio and keyword metrics from the
        // primary path do not transfer; only the length floor applies.
        if text.len() < self.min_fallback_text_length {
            return Err(Error::Resolution {
                reason: "quality_check_failed".to_string(),
            });
        }

        info!(url = %url, text_length = text.len(), "Fallback resolution accepted");
        Ok(ResolvedPage {
            url: url.to_string(),
            title: page.title,
            text_length: text.len(),
            text,
            method: ResolveMethod::Fallback,
            fetched_at: Utc::now(),
        })
    }

    async fn fetch_primary(&self, url: &Url) -> std::result::Result<String, String> {
        match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Err(format!("HTTP {}", status));
                }
                response
                    .text()
                    .await
                    .map_err(|e| format!("body read failed: {}", e))
            }
            Err(e) if e.is_timeout() => Err("request timed out".to_string()),
            Err(e) => Err(format!("request failed: {}", e)),
        }
    }
}

/// Validate a URL before any network call.
///
/// Requires an absolute http(s) URL with a host; plain http is upgraded to
/// https except for loopback hosts, which stay as given.
pub fn validate_url(input: &str) -> Result<Url> {
    let mut url =
        Url::parse(input).map_err(|e| Error::InvalidUrl(format!("{}: {}", input, e)))?;

    match url.scheme() {
        "https" => {}
        "http" if is_loopback(&url) => {}
        "http" => {
            url.set_scheme("https")
                .map_err(|_| Error::InvalidUrl(input.to_string()))?;
        }
        other => {
            return Err(Error::InvalidUrl(format!(
                "unsupported scheme '{}': {}",
                other, input
            )));
        }
    }

    if url.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("missing host: {}", input)));
    }

    Ok(url)
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        Some(url::Host::Domain(domain)) => domain == "localhost",
        None => false,
    }
}
