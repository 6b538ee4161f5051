//! Default values for configuration

/// Default primary fetch timeout (10 seconds)
pub fn default_resolver_timeout() -> u64 {
    10
}

/// Default user agent
pub fn default_resolver_user_agent() -> String {
    format!(
        "Mozilla/5.0 (compatible; siteintel/{}; Website Intelligence Bot)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Default environment variable name for the fallback reader API key
pub fn default_fallback_api_key_env() -> String {
    "READER_API_KEY".to_string()
}

/// Default minimum cleaned text length
pub fn default_min_text_length() -> usize {
    500
}

/// Default minimum text-to-HTML ratio
pub fn default_min_text_ratio() -> f64 {
    0.1
}

/// Default minimum business keyword matches
pub fn default_min_keyword_matches() -> usize {
    2
}

/// Default maximum characters per chunk
pub fn default_chunk_max_chars() -> usize {
    1000
}

/// Default overlap characters between chunks
pub fn default_chunk_overlap() -> usize {
    200
}

/// Default embedding model
pub fn default_embedding_model() -> String {
    "text-embedding-004".to_string()
}

/// Default embedding dimension (text-embedding-004 produces 768)
pub fn default_embedding_dimension() -> usize {
    768
}

/// Default concurrent chunk-embedding calls
pub fn default_embedding_concurrency() -> usize {
    4
}

/// Default generative model
pub fn default_model_name() -> String {
    "gemini-2.0-flash".to_string()
}

/// Default model API base URL
pub fn default_model_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

/// Default environment variable name for the model API key
pub fn default_model_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Default maximum retries for transient model errors
pub fn default_model_max_retries() -> u32 {
    2
}

/// Default initial backoff in milliseconds
pub fn default_model_backoff_ms() -> u64 {
    250
}

/// Default maximum content characters in an extraction prompt
pub fn default_max_content_chars() -> usize {
    8000
}

/// Default number of source chunks per answer
pub fn default_chat_top_k() -> usize {
    5
}

/// Default minimum similarity score for sources
pub fn default_chat_min_score() -> f32 {
    0.0
}

/// Default maximum prior turns included in a chat prompt
pub fn default_max_history_turns() -> usize {
    6
}
