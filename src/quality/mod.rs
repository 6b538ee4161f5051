//! Content quality scoring
//!
//! Decides whether cleaned page text carries enough signal to feed the
//! insight extractor, or whether the resolver should fall back to the
//! external reader service. This models the common failure mode of
//! JavaScript-rendered pages returning near-empty markup.

use crate::config::QualityConfig;

/// Business-related keywords counted as signal in cleaned text
pub const BUSINESS_KEYWORDS: &[&str] = &[
    "company", "about", "product", "service", "business", "team", "contact", "pricing",
    "features", "solutions", "platform", "technology", "industry", "customers", "clients",
    "partners", "mission", "vision", "values", "leadership", "careers", "jobs", "news", "blog",
    "resources", "support",
];

/// Measured content quality metrics
#[derive(Debug, Clone, PartialEq)]
pub struct QualityMetrics {
    /// Length of the trimmed cleaned text
    pub text_length: usize,

    /// Length of the raw HTML
    pub html_length: usize,

    /// Cleaned text length divided by raw HTML length
    pub text_ratio: f64,

    /// Number of distinct business keywords found in the text
    pub keyword_matches: usize,
}

/// Outcome of scoring a page
#[derive(Debug, Clone)]
pub struct QualityReport {
    /// Whether the page clears every threshold
    pub accept: bool,

    /// The measured metrics
    pub metrics: QualityMetrics,

    /// Human-readable rejection reason (empty string when accepted)
    pub reason: String,
}

/// Scores extracted text for signal-to-noise before acceptance
#[derive(Debug, Clone)]
pub struct QualityClassifier {
    config: QualityConfig,
}

impl QualityClassifier {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    /// Score a cleaned text against its raw HTML source.
    ///
    /// Length, ratio, and keyword thresholds are independent necessary
    /// conditions; failing any one rejects the page.
    pub fn score(&self, raw_html: &str, cleaned_text: &str) -> QualityReport {
        let metrics = analyze(raw_html, cleaned_text);

        let mut reasons = Vec::new();
        if metrics.text_length < self.config.min_text_length {
            reasons.push(format!(
                "text too short ({} < {})",
                metrics.text_length, self.config.min_text_length
            ));
        }
        if metrics.text_ratio < self.config.min_text_ratio {
            reasons.push(format!(
                "low text ratio ({:.3} < {})",
                metrics.text_ratio, self.config.min_text_ratio
            ));
        }
        if metrics.keyword_matches < self.config.min_keyword_matches {
            reasons.push(format!(
                "insufficient keywords ({} < {})",
                metrics.keyword_matches, self.config.min_keyword_matches
            ));
        }

        QualityReport {
            accept: reasons.is_empty(),
            metrics,
            reason: reasons.join("; "),
        }
    }
}

fn analyze(raw_html: &str, cleaned_text: &str) -> QualityMetrics {
    let text_length = cleaned_text.trim().len();
    let html_length = raw_html.len();
    let text_ratio = if html_length > 0 {
        text_length as f64 / html_length as f64
    } else {
        0.0
    };

    let text_lower = cleaned_text.to_lowercase();
    let keyword_matches = BUSINESS_KEYWORDS
        .iter()
        .filter(|keyword| text_lower.contains(*keyword))
        .count();

    QualityMetrics {
        text_length,
        html_length,
        text_ratio,
        keyword_matches,
    }
}
