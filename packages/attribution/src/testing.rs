//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the attribution
//! library without a running RAG engine or a real segment database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{AttributionError, Result};
use crate::stores::memory::MemoryStore;
use crate::traits::retrieval::{RetrievalMode, RetrievalResponse, Retriever};
use crate::types::segment::Segment;

/// A mock retriever for testing.
///
/// Returns scripted context and answer text per retrieval mode, without
/// calling a real RAG engine. Modes with no fixture return empty strings,
/// which the pipeline treats as "retrieval succeeded, found nothing".
#[derive(Default)]
pub struct MockRetriever {
    /// Scripted context text by mode
    contexts: Arc<RwLock<HashMap<RetrievalMode, String>>>,

    /// Scripted answer text by mode
    answers: Arc<RwLock<HashMap<RetrievalMode, String>>>,

    /// Modes that should fail, with their error message
    errors: Arc<RwLock<HashMap<RetrievalMode, String>>>,

    /// Artificial latency applied to every call
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<RecordedRetrieval>>>,
}

/// Record of a call made to the mock retriever.
#[derive(Debug, Clone)]
pub struct RecordedRetrieval {
    pub query: String,
    pub mode: RetrievalMode,
    pub context_only: bool,
}

impl MockRetriever {
    /// Create a new mock retriever with no fixtures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the context returned for a mode.
    pub fn with_context(self, mode: RetrievalMode, context: impl Into<String>) -> Self {
        self.contexts.write().unwrap().insert(mode, context.into());
        self
    }

    /// Script the generated answer returned for a mode.
    pub fn with_answer(self, mode: RetrievalMode, answer: impl Into<String>) -> Self {
        self.answers.write().unwrap().insert(mode, answer.into());
        self
    }

    /// Make retrieval in a mode fail with the given message.
    pub fn with_error(self, mode: RetrievalMode, message: impl Into<String>) -> Self {
        self.errors.write().unwrap().insert(mode, message.into());
        self
    }

    /// Delay every call, for exercising timeouts and cancellation.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<RecordedRetrieval> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn retrieve(
        &self,
        query: &str,
        mode: RetrievalMode,
        context_only: bool,
    ) -> Result<RetrievalResponse> {
        self.calls.write().unwrap().push(RecordedRetrieval {
            query: query.to_string(),
            mode,
            context_only,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let error = self.errors.read().unwrap().get(&mode).cloned();
        if let Some(message) = error {
            return Err(AttributionError::Retrieval(message.into()));
        }

        let context = self
            .contexts
            .read()
            .unwrap()
            .get(&mode)
            .cloned()
            .unwrap_or_default();

        if context_only {
            return Ok(RetrievalResponse::context_only(context));
        }

        let answer = self
            .answers
            .read()
            .unwrap()
            .get(&mode)
            .cloned()
            .unwrap_or_default();

        Ok(RetrievalResponse::new(context, answer))
    }
}

/// Builder for creating test scenarios.
pub struct TestScenario {
    store: MemoryStore,
    retriever: MockRetriever,
}

impl TestScenario {
    /// Create a new test scenario.
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            retriever: MockRetriever::new(),
        }
    }

    /// Add a video with a title and `(segment_id, start, end, text)` rows.
    pub fn with_video(
        self,
        video_id: &str,
        title: &str,
        segments: Vec<(i64, f64, f64, &str)>,
    ) -> Self {
        self.store.set_title(video_id, title);
        for (segment_id, start, end, text) in segments {
            self.store
                .add_segment(Segment::new(video_id, segment_id, start, end, text));
        }
        self
    }

    /// Script the retriever's context for a mode.
    pub fn with_context(mut self, mode: RetrievalMode, context: impl Into<String>) -> Self {
        self.retriever = self.retriever.with_context(mode, context);
        self
    }

    /// Script the retriever's answer for a mode.
    pub fn with_answer(mut self, mode: RetrievalMode, answer: impl Into<String>) -> Self {
        self.retriever = self.retriever.with_answer(mode, answer);
        self
    }

    /// Make retrieval in a mode fail.
    pub fn with_retrieval_error(mut self, mode: RetrievalMode, message: impl Into<String>) -> Self {
        self.retriever = self.retriever.with_error(mode, message);
        self
    }

    /// Get both test doubles.
    pub fn build(self) -> (MemoryStore, MockRetriever) {
        (self.store, self.retriever)
    }
}

impl Default for TestScenario {
    fn default() -> Self {
        Self::new()
    }
}
