//! Business insight records and output-schema enforcement
//!
//! Model output is loosely typed, so validation happens explicitly at the
//! boundary: raw text is parsed and checked against the declared field set
//! and types, producing a tagged `Validated` result rather than trusting
//! the model by default.

mod extractor;
mod prompts;

pub use extractor::*;
pub use prompts::*;

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Contact details extracted from page content
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone: Option<String>,

    #[serde(default)]
    pub address: Option<String>,
}

/// Structured business insight produced once per session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    pub industry: String,

    pub company_size: String,

    pub location: String,

    /// Unique selling proposition
    pub usp: String,

    pub products_services: Vec<String>,

    pub target_audience: String,

    #[serde(default)]
    pub contact_info: ContactInfo,

    /// Model-reported confidence (1-10), surfaced verbatim
    #[serde(deserialize_with = "de_confidence")]
    pub confidence: u8,

    #[serde(default)]
    pub key_insights: Vec<String>,

    /// Answers to caller-supplied custom questions, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_answers: Option<BTreeMap<String, String>>,
}

/// Models occasionally return the confidence as a quoted number.
fn de_confidence<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as DeError;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => u8::try_from(n).map_err(|_| DeError::custom("confidence out of range")),
        Raw::Text(s) => s
            .trim()
            .parse::<u8>()
            .map_err(|_| DeError::custom(format!("confidence is not numeric: {:?}", s))),
    }
}

/// Tagged result of validating raw model output against the insight schema
#[derive(Debug)]
pub enum Validated {
    Valid(InsightRecord),
    Invalid(String),
}

/// Validate raw model output against the InsightRecord schema.
///
/// Strips Markdown code fences, parses JSON, checks field presence/types,
/// and enforces the 1-10 confidence range (out-of-range confidence is a
/// schema violation, never clamped).
pub fn validate_output(raw: &str) -> Validated {
    let json = strip_code_fences(raw);

    let record: InsightRecord = match serde_json::from_str(json) {
        Ok(record) => record,
        Err(e) => return Validated::Invalid(format!("malformed insight JSON: {}", e)),
    };

    if !(1..=10).contains(&record.confidence) {
        return Validated::Invalid(format!(
            "confidence {} outside 1-10 range",
            record.confidence
        ));
    }

    Validated::Valid(record)
}

/// Strip ```json ... ``` (or plain ```) fences surrounding model output
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();

    for marker in ["```json", "```"] {
        if let Some(start) = trimmed.find(marker) {
            let inner_start = start + marker.len();
            if let Some(end) = trimmed[inner_start..].find("```") {
                return trimmed[inner_start..inner_start + end].trim();
            }
        }
    }

    trimmed
}
