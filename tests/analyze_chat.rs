//! End-to-end tests for analysis and session chat

use async_trait::async_trait;
use chrono::Utc;
use siteintel::analyze::Analyzer;
use siteintel::chat::ConversationOrchestrator;
use siteintel::config::{ChatConfig, ChunkConfig, EmbeddingConfig, ModelConfig, QualityConfig, ResolverConfig};
use siteintel::embed::EmbeddingService;
use siteintel::error::{Error, Result};
use siteintel::index::ContextIndexer;
use siteintel::insight::{ContactInfo, InsightExtractor, InsightRecord};
use siteintel::llm::{GenerativeModel, RetryPolicy};
use siteintel::quality::QualityClassifier;
use siteintel::resolve::{ContentResolver, ResolveMethod, ResolvedPage};
use siteintel::session::{MemorySessionStore, Session, SessionStore};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct ScriptedModel {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            return Err(Error::Model("script exhausted".to_string()));
        }
        Ok(replies.remove(0))
    }
}

struct ConstantEmbedder;

#[async_trait]
impl EmbeddingService for ConstantEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}

fn insight_json() -> &'static str {
    r#"{
        "industry": "SaaS",
        "company_size": "Small",
        "location": "Berlin, Germany",
        "usp": "Fast analytics",
        "products_services": ["Analytics platform"],
        "target_audience": "Enterprise teams",
        "contact_info": {"email": "hello@acme.example"},
        "confidence": 8,
        "key_insights": ["Usage-based pricing"]
    }"#
}

fn sample_insights() -> InsightRecord {
    InsightRecord {
        industry: "SaaS".to_string(),
        company_size: "Small".to_string(),
        location: "Berlin".to_string(),
        usp: "Fast analytics".to_string(),
        products_services: vec!["Analytics platform".to_string()],
        target_audience: "Enterprise teams".to_string(),
        contact_info: ContactInfo::default(),
        confidence: 8,
        key_insights: vec!["Usage-based pricing".to_string()],
        custom_answers: None,
    }
}

fn rich_html() -> String {
    let paragraph = "Acme builds an analytics platform for enterprise customers. \
                     The product offers transparent pricing and a dedicated support \
                     team that helps clients and partners onboard quickly. ";
    format!(
        "<html><head><title>Acme</title></head><body><main><p>{}</p></main></body></html>",
        paragraph.repeat(6)
    )
}

fn analyzer(model: Arc<ScriptedModel>, store: Arc<dyn SessionStore>) -> Analyzer {
    let resolver = ContentResolver::new(
        &ResolverConfig::default(),
        QualityClassifier::new(QualityConfig::default()),
        None,
        500,
    )
    .unwrap();
    let extractor = InsightExtractor::new(
        model,
        &ModelConfig {
            max_retries: 0,
            initial_backoff_ms: 1,
            ..ModelConfig::default()
        },
    );
    let indexer = ContextIndexer::new(
        Arc::new(ConstantEmbedder),
        ChunkConfig::default(),
        &EmbeddingConfig::default(),
    );
    Analyzer::new(resolver, extractor, indexer, store)
}

fn orchestrator(model: Arc<ScriptedModel>, store: Arc<dyn SessionStore>) -> ConversationOrchestrator {
    ConversationOrchestrator::new(
        store,
        Arc::new(ConstantEmbedder),
        model,
        ChatConfig::default(),
        RetryPolicy::new(0, 1),
    )
}

#[tokio::test]
async fn analyze_then_chat_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rich_html()))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let model = ScriptedModel::new(&[insight_json(), "They sell analytics.", "It is usage-based."]);

    let outcome = analyzer(model.clone(), store.clone())
        .analyze(&server.uri(), &[])
        .await
        .unwrap();

    assert_eq!(outcome.method, ResolveMethod::Primary);
    assert_eq!(outcome.insights.industry, "SaaS");
    assert!(outcome.chunk_count >= 1);

    let session = store.get(outcome.session_id).await.unwrap().unwrap();
    assert_eq!(session.insights.confidence, 8);
    assert_eq!(
        store.chunks(outcome.session_id).await.unwrap().len(),
        outcome.chunk_count
    );

    // Two sequential chat turns: the second prompt carries the first
    // exchange, in order.
    let orch = orchestrator(model.clone(), store.clone());
    let first = orch
        .answer(outcome.session_id, "What do they sell?")
        .await
        .unwrap();
    assert_eq!(first.answer, "They sell analytics.");
    assert!(!first.sources.is_empty());

    let second = orch
        .answer(outcome.session_id, "How is it priced?")
        .await
        .unwrap();
    assert_eq!(second.answer, "It is usage-based.");

    let prompts = model.prompts();
    let chat_prompt = prompts.last().unwrap();
    let q1 = chat_prompt.find("User: What do they sell?").unwrap();
    let a1 = chat_prompt.find("Assistant: They sell analytics.").unwrap();
    let q2 = chat_prompt.find("User: How is it priced?").unwrap();
    assert!(q1 < a1);
    assert!(a1 < q2);

    let history = store.history(outcome.session_id).await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn custom_questions_reach_the_extraction_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rich_html()))
        .mount(&server)
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let model = ScriptedModel::new(&[insight_json()]);

    analyzer(model.clone(), store)
        .analyze(
            &server.uri(),
            &["Do they offer a free trial?".to_string()],
        )
        .await
        .unwrap();

    let prompts = model.prompts();
    assert!(prompts[0].contains("Do they offer a free trial?"));
    assert!(prompts[0].contains("custom_answers"));
}

#[tokio::test]
async fn chat_with_unknown_session_never_calls_model() {
    let store = Arc::new(MemorySessionStore::new());
    let model = ScriptedModel::new(&["unused"]);

    let err = orchestrator(model.clone(), store)
        .answer(Uuid::new_v4(), "anything")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::SessionNotFound(_)));
    assert!(model.prompts().is_empty());
}

#[tokio::test]
async fn chat_without_chunks_uses_insight_profile() {
    let store = Arc::new(MemorySessionStore::new());
    let session = Session {
        id: Uuid::new_v4(),
        page: ResolvedPage {
            url: "https://acme.example/".to_string(),
            title: Some("Acme".to_string()),
            text: "Acme analytics".to_string(),
            text_length: 14,
            method: ResolveMethod::Fallback,
            fetched_at: Utc::now(),
        },
        insights: sample_insights(),
        created_at: Utc::now(),
    };
    store.create(&session, &[]).await.unwrap();

    let model = ScriptedModel::new(&["They are a SaaS company."]);
    let answer = orchestrator(model.clone(), store)
        .answer(session.id, "Who are they?")
        .await
        .unwrap();

    assert!(answer.sources.is_empty());
    let prompts = model.prompts();
    assert!(prompts[0].contains("Business profile extracted from the website"));
    assert!(prompts[0].contains("Industry: SaaS"));
}
