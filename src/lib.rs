//! siteintel - website intelligence pipeline
//!
//! Turns a URL into a chat-ready analysis session:
//!
//! 1. **Resolve**: fetch and clean the page, score content quality, fall
//!    back once to an external reader service when the primary path fails
//! 2. **Extract**: prompt a generative model for a fixed-schema business
//!    insight record, with strict output validation
//! 3. **Index**: chunk the resolved text and embed each chunk for retrieval
//! 4. **Chat**: answer follow-up questions grounded in the indexed content
//!    and the running conversation history

pub mod analyze;
pub mod chat;
pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod index;
pub mod insight;
pub mod llm;
pub mod parse;
pub mod quality;
pub mod resolve;
pub mod session;

pub use analyze::{AnalysisOutcome, Analyzer};
pub use chat::{ChatAnswer, ConversationOrchestrator};
pub use config::Config;
pub use error::{Error, Result};
