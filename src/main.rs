// MindMitra - Emotion-aware companion chat service
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mindmitra::config::{load_config, Config};
use mindmitra::crisis::{CrisisDetector, CrisisLexicon, MatchMode};
use mindmitra::emotion::{Emotion, EmotionResult, RemoteEmotionClassifier};
use mindmitra::errors::{lexicon_load_error, UserFriendlyError};
use mindmitra::generator::{GenerationParams, ResponseGenerator};
use mindmitra::metrics::PipelineMetrics;
use mindmitra::pipeline::{Pipeline, Utterance};
use mindmitra::providers::{LlmProvider, OpenRouterProvider};
use mindmitra::server::{AppState, ChatServer};
use mindmitra::storage::{MemoryStore, Storage, SupabaseStore};
use tracing_subscriber::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "mindmitra")]
#[command(about = "Emotion-aware companion chat service", version)]
struct Args {
    /// Config file (default: ~/.mindmitra/config.toml, then environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Send one message through the full pipeline and print the result
    Chat {
        /// User id the message belongs to
        #[arg(long, default_value = "cli")]
        user: String,
        /// Message text
        message: String,
    },
    /// Run only the crisis detector (offline)
    Check {
        /// Text to check
        text: String,
        /// Emotion label to pair with the text
        #[arg(long, default_value = "neutral")]
        emotion: String,
        /// Confidence for the emotion label
        #[arg(long, default_value_t = 0.0)]
        confidence: f32,
        /// Lexicon JSON file replacing the built-in phrases
        #[arg(long)]
        lexicon: Option<PathBuf>,
        /// Only match phrases on word boundaries
        #[arg(long)]
        word_boundary: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Serve { bind } => {
            let config = load_config(args.config.as_deref())?;
            run_server(config, bind).await
        }
        Command::Chat { user, message } => {
            let config = load_config(args.config.as_deref())?;
            run_chat(config, &user, &message).await
        }
        Command::Check {
            text,
            emotion,
            confidence,
            lexicon,
            word_boundary,
        } => run_check(&text, &emotion, confidence, lexicon.as_deref(), word_boundary),
    }
}

fn init_tracing() {
    let show_debug = std::env::var("MINDMITRA_DEBUG")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false);

    let env_filter = if show_debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Bridge log crate → tracing (for dependencies using log crate)
    tracing_log::LogTracer::init().ok();
}

async fn run_server(config: Config, bind: Option<String>) -> Result<()> {
    let metrics = PipelineMetrics::new().context("Failed to register metrics")?;
    let (pipeline, storage) = build_pipeline(&config, Some(metrics.clone()))?;

    let bind_address = bind.unwrap_or_else(|| config.server.bind_address.clone());
    if config.is_production() {
        tracing::info!("Running in production mode");
    }

    let state = AppState {
        pipeline: Arc::new(pipeline),
        moods: storage.moods,
        metrics,
        cors_origins: config.cors_origins(),
    };

    ChatServer::new(state, bind_address).serve().await
}

async fn run_chat(config: Config, user: &str, message: &str) -> Result<()> {
    let utterance = Utterance::new(user, message)?;
    let (pipeline, _storage) = build_pipeline(&config, None)?;

    let result = pipeline.process_and_wait(&utterance).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_check(
    text: &str,
    emotion: &str,
    confidence: f32,
    lexicon: Option<&Path>,
    word_boundary: bool,
) -> Result<()> {
    let label: Emotion = emotion.to_lowercase().parse()?;
    let detector = build_detector(lexicon, word_boundary)?;

    let verdict = detector.detect(text, &EmotionResult::new(label, confidence));
    println!("{}", serde_json::to_string_pretty(&verdict)?);
    Ok(())
}

fn build_detector(lexicon_path: Option<&Path>, word_boundary: bool) -> Result<CrisisDetector> {
    let lexicon = match lexicon_path {
        Some(path) => {
            let lexicon = CrisisLexicon::load_from_file(path)
                .user_context(&lexicon_load_error(&path.display().to_string()))?;
            tracing::info!(
                path = %path.display(),
                phrases = lexicon.phrases.len(),
                "Loaded crisis lexicon"
            );
            lexicon
        }
        None => CrisisLexicon::default(),
    };

    let mode = if word_boundary {
        MatchMode::WordBoundary
    } else {
        MatchMode::Substring
    };
    Ok(CrisisDetector::new(lexicon).with_match_mode(mode))
}

/// Wire the provider, classifier, generator and storage from config
fn build_pipeline(config: &Config, metrics: Option<PipelineMetrics>) -> Result<(Pipeline, Storage)> {
    let openrouter = &config.openrouter;
    let provider: Arc<dyn LlmProvider> = Arc::new(
        OpenRouterProvider::new(openrouter.api_key.clone(), openrouter.model.clone())?
            .with_base_url(openrouter.base_url.clone())
            .with_referer(openrouter.frontend_url.clone()),
    );
    tracing::info!(model = %openrouter.model, "Using OpenRouter");

    let classifier = Arc::new(
        RemoteEmotionClassifier::new(Arc::clone(&provider))
            .with_timeout(openrouter.classification_timeout()),
    );

    let generator = ResponseGenerator::new(provider).with_params(GenerationParams {
        model: openrouter.model.clone(),
        timeout: openrouter.generation_timeout(),
        ..GenerationParams::default()
    });

    let storage = match &config.supabase {
        Some(supabase) => {
            tracing::info!(url = %supabase.url, "Using Supabase storage");
            Storage::from_backend(Arc::new(SupabaseStore::new(
                &supabase.url,
                supabase.service_key.clone(),
            )?))
        }
        None => {
            tracing::warn!("Supabase not configured, conversations are kept in memory only");
            Storage::from_backend(Arc::new(MemoryStore::new()))
        }
    };

    let detector = build_detector(
        config.crisis.lexicon_path.as_deref(),
        config.crisis.word_boundary,
    )?;

    let mut pipeline = Pipeline::new(
        classifier,
        generator,
        Arc::clone(&storage.history),
        Arc::clone(&storage.persistence),
    )
    .with_detector(detector);
    if let Some(metrics) = metrics {
        pipeline = pipeline.with_metrics(metrics);
    }

    Ok((pipeline, storage))
}
