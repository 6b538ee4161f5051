//! siteintel CLI entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use siteintel::{
    analyze::Analyzer,
    chat::ConversationOrchestrator,
    config::Config,
    embed::GeminiEmbedder,
    index::ContextIndexer,
    insight::InsightExtractor,
    llm::{GeminiModel, RetryPolicy},
    quality::QualityClassifier,
    resolve::{ContentResolver, FallbackReader, HttpReader},
    session::{SessionStore, SqliteSessionStore},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Timeout for model and embedding API calls
const API_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser)]
#[command(name = "siteintel")]
#[command(version, about = "Website analysis and chat over extracted business insights", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the session database
    #[arg(long, global = true, default_value = "siteintel.db")]
    db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a website URL and create a chat session
    Analyze {
        /// URL to analyze
        url: String,

        /// Additional question to answer during extraction (repeatable)
        #[arg(short, long = "question")]
        questions: Vec<String>,
    },

    /// Ask a question against an analyzed session
    Chat {
        /// Session ID from a previous analyze run
        session_id: Uuid,

        /// The question to ask
        question: String,
    },

    /// Suggest follow-up questions for a session
    Suggest {
        /// Session ID from a previous analyze run
        session_id: Uuid,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = Config::load_or_default(cli.config.as_deref())?;

    let api_key = std::env::var(&config.model.api_key_env).with_context(|| {
        format!(
            "model API key not set (expected in ${})",
            config.model.api_key_env
        )
    })?;

    let model = Arc::new(GeminiModel::new(&config.model, &api_key, API_TIMEOUT)?);
    let embedder = Arc::new(GeminiEmbedder::new(
        &config.embedding,
        &config.model.api_base,
        &api_key,
        API_TIMEOUT,
    )?);
    let store: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::open(&cli.db).await?);

    match cli.command {
        Commands::Analyze { url, questions } => {
            let fallback: Option<Arc<dyn FallbackReader>> = match &config.resolver.fallback_url {
                Some(base) => {
                    let reader_key = std::env::var(&config.resolver.fallback_api_key_env).ok();
                    Some(Arc::new(HttpReader::new(
                        base,
                        reader_key.as_deref(),
                        Duration::from_secs(config.resolver.timeout_secs),
                    )?))
                }
                None => None,
            };

            let resolver = ContentResolver::new(
                &config.resolver,
                QualityClassifier::new(config.quality.clone()),
                fallback,
                config.quality.min_text_length,
            )?;
            let extractor = InsightExtractor::new(model.clone(), &config.model);
            let indexer =
                ContextIndexer::new(embedder.clone(), config.chunk.clone(), &config.embedding);

            let analyzer = Analyzer::new(resolver, extractor, indexer, store);
            let outcome = analyzer.analyze(&url, &questions).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!("✓ Analysis complete ({})", outcome.method.as_str());
                println!("  Session: {}", outcome.session_id);
                println!("  Industry: {}", outcome.insights.industry);
                println!("  Company size: {}", outcome.insights.company_size);
                println!("  Location: {}", outcome.insights.location);
                println!("  USP: {}", outcome.insights.usp);
                if !outcome.insights.products_services.is_empty() {
                    println!(
                        "  Products/services: {}",
                        outcome.insights.products_services.join(", ")
                    );
                }
                println!("  Target audience: {}", outcome.insights.target_audience);
                println!("  Confidence: {}/10", outcome.insights.confidence);
                for insight in &outcome.insights.key_insights {
                    println!("  - {}", insight);
                }
                if let Some(answers) = &outcome.insights.custom_answers {
                    println!("  Custom answers:");
                    for (question, answer) in answers {
                        println!("    {}: {}", question, answer);
                    }
                }
                println!("  Indexed chunks: {}", outcome.chunk_count);
                println!("\nNext: siteintel chat {} \"your question\"", outcome.session_id);
            }
        }

        Commands::Chat {
            session_id,
            question,
        } => {
            let orchestrator = chat_orchestrator(store, embedder, model, &config);
            let answer = orchestrator.answer(session_id, &question).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.answer);
                if !answer.sources.is_empty() {
                    println!("\nSources:");
                    for source in &answer.sources {
                        println!(
                            "  [chunk {} | score {:.3}] {}",
                            source.order_index,
                            source.score,
                            snippet_preview(&source.text)
                        );
                    }
                }
            }
        }

        Commands::Suggest { session_id } => {
            let orchestrator = chat_orchestrator(store, embedder, model, &config);
            let suggestions = orchestrator.suggest_follow_ups(session_id).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else if suggestions.is_empty() {
                println!("No suggestions available.");
            } else {
                for suggestion in &suggestions {
                    println!("- {}", suggestion);
                }
            }
        }
    }

    Ok(())
}

fn chat_orchestrator(
    store: Arc<dyn SessionStore>,
    embedder: Arc<GeminiEmbedder>,
    model: Arc<GeminiModel>,
    config: &Config,
) -> ConversationOrchestrator {
    ConversationOrchestrator::new(
        store,
        embedder,
        model,
        config.chat.clone(),
        RetryPolicy::new(config.model.max_retries, config.model.initial_backoff_ms),
    )
}

fn snippet_preview(text: &str) -> String {
    const PREVIEW_CHARS: usize = 120;
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let preview: String = text.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", preview.trim_end())
}
