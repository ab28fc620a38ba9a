use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use shield::classifier::{ClassifierConfig, SequenceClassifier};
use shield::embedding::{SentenceConfig, SentenceEmbedder};
use shield::gateway::{HandlerState, ModelMode, create_router_with_state};
use shield::index::{ReferenceCorpus, ReferenceIndex, SimilarityIndex};
use shield::language::LanguageIdentifier;
use shield::pipeline::ScoringPipeline;
use shield::scoring::ScoreCombiner;

use super::fixtures::{reference_texts, write_corpus};

pub const TEST_EMBEDDING_DIM: usize = 64;

pub struct TestServerConfig {
    pub references: Vec<&'static str>,
    pub max_document_chars: usize,
    pub request_timeout: Duration,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            references: reference_texts(),
            max_document_chars: 10_000,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// A server on an ephemeral port backed by stub models.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
    pub dir: TempDir,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_test_server(config: TestServerConfig) -> anyhow::Result<TestServer> {
    let dir = tempfile::tempdir()?;
    let corpus_path = write_corpus(dir.path(), &config.references);

    let classifier = SequenceClassifier::load(&ClassifierConfig::stub())?;
    let embedder =
        SentenceEmbedder::load(SentenceConfig::stub().with_embedding_dim(TEST_EMBEDDING_DIM))?;

    let corpus = ReferenceCorpus::load(&corpus_path)?;
    let reference = Arc::new(ReferenceIndex::load_or_build(
        &corpus,
        &embedder,
        &dir.path().join("reference_embeddings.rkyv"),
    )?);
    let index = SimilarityIndex::new(embedder, reference, 128)?;

    let pipeline = ScoringPipeline::new(
        LanguageIdentifier::with_default_detector(true),
        classifier,
        index,
        ScoreCombiner::default(),
    );

    let state = HandlerState::new(
        Arc::new(pipeline),
        config.request_timeout,
        config.max_document_chars,
    )
    .with_modes(ModelMode::Stub, ModelMode::Stub);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = create_router_with_state(state);

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer { addr, handle, dir })
}
