//! PlagiariShield HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use shield::classifier::SequenceClassifier;
use shield::config::Config;
use shield::embedding::{SentenceEmbedder, TextEmbedder};
use shield::gateway::{HandlerState, ModelMode, create_router_with_state};
use shield::index::{ReferenceCorpus, ReferenceIndex, SimilarityIndex};
use shield::language::LanguageIdentifier;
use shield::pipeline::ScoringPipeline;
use shield::scoring::ScoreCombiner;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "PlagiariShield starting"
    );

    if config.classifier_path.is_none() {
        tracing::warn!("No SHIELD_CLASSIFIER_PATH configured, running classifier in stub mode");
    }
    let classifier = SequenceClassifier::load(&config.classifier_config())?;

    if config.embedder_path.is_none() {
        tracing::warn!("No SHIELD_EMBEDDER_PATH configured, running embedder in stub mode");
    }
    let embedder = SentenceEmbedder::load(config.sentence_config())?;

    let classifier_mode = ModelMode::from_stub(classifier.is_stub());
    let embedder_mode = ModelMode::from_stub(embedder.is_stub());

    let corpus = ReferenceCorpus::load(&config.corpus_path)?;
    let reference = Arc::new(ReferenceIndex::load_or_build(
        &corpus,
        &embedder,
        &config.embeddings_cache_path,
    )?);
    tracing::info!(
        references = reference.len(),
        dim = embedder.embedding_dim(),
        "Reference index ready"
    );

    let index = SimilarityIndex::new(embedder, reference, config.lookup_cache_capacity)?;
    let identifier = LanguageIdentifier::with_default_detector(config.lang_detect);
    tracing::info!(detector = identifier.detector_name(), "Language identifier ready");

    let pipeline = Arc::new(ScoringPipeline::new(
        identifier,
        classifier,
        index,
        ScoreCombiner::default(),
    ));

    let state = HandlerState::new(pipeline, config.request_timeout, config.max_document_chars)
        .with_modes(classifier_mode, embedder_mode);

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("PlagiariShield shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("SHIELD_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let Ok(rt) = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    else {
        return 1;
    };

    rt.block_on(async {
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        else {
            return 1;
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
