use std::sync::Arc;
use std::time::Duration;

use crate::pipeline::ScoringPipeline;

/// Whether a collaborator runs real weights or the deterministic stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelMode {
    Model,
    Stub,
}

impl ModelMode {
    pub fn from_stub(is_stub: bool) -> Self {
        if is_stub { ModelMode::Stub } else { ModelMode::Model }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelMode::Model => "model",
            ModelMode::Stub => "stub",
        }
    }
}

pub struct HandlerState<C, E> {
    pub pipeline: Arc<ScoringPipeline<C, E>>,

    /// Deadline for scoring one document.
    pub request_timeout: Duration,

    pub max_document_chars: usize,

    pub classifier_mode: ModelMode,

    pub embedder_mode: ModelMode,
}

// Manual impl: the pipeline sits behind an `Arc`, so `C`/`E` need not be `Clone`.
impl<C, E> Clone for HandlerState<C, E> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            request_timeout: self.request_timeout,
            max_document_chars: self.max_document_chars,
            classifier_mode: self.classifier_mode,
            embedder_mode: self.embedder_mode,
        }
    }
}

impl<C, E> HandlerState<C, E> {
    pub fn new(
        pipeline: Arc<ScoringPipeline<C, E>>,
        request_timeout: Duration,
        max_document_chars: usize,
    ) -> Self {
        Self {
            pipeline,
            request_timeout,
            max_document_chars,
            classifier_mode: ModelMode::Model,
            embedder_mode: ModelMode::Model,
        }
    }

    pub fn with_modes(mut self, classifier: ModelMode, embedder: ModelMode) -> Self {
        self.classifier_mode = classifier;
        self.embedder_mode = embedder;
        self
    }
}
