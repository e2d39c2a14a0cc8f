//! Retrieval trait - the boundary to the external RAG engine.
//!
//! The engine is a black box that answers natural-language queries over the
//! indexed transcript corpus. This library only cares about two things it
//! returns: the raw context trace (where citation markers live) and the
//! generated answer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Retrieval strategy of the RAG engine.
///
/// A closed enumeration so an invalid mode cannot silently no-op the way a
/// raw string could.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    /// Vector-only similarity search. Preserves per-chunk metadata headers
    /// best, so it is the preferred source of citation candidates.
    Vector,
    /// Graph-augmented synthesis across entities. Richer answers, but the
    /// attached headers can belong to semantically similar yet factually
    /// unrelated segments.
    Graph,
}

impl RetrievalMode {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RetrievalMode::Vector => "vector",
            RetrievalMode::Graph => "graph",
        }
    }
}

impl fmt::Display for RetrievalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one retrieval call returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResponse {
    /// Raw context trace with inline citation markers.
    pub context: String,

    /// Generated natural-language answer. Empty when the call was made with
    /// `context_only = true`.
    pub answer: String,
}

impl RetrievalResponse {
    /// Create a response with both context and answer.
    pub fn new(context: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            answer: answer.into(),
        }
    }

    /// Create a context-only response (no generated answer).
    pub fn context_only(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            answer: String::new(),
        }
    }
}

/// The RAG engine boundary.
///
/// Implementations are injected into the engine; the library never holds a
/// global client. [`crate::clients::LightRagClient`] is the in-crate HTTP
/// implementation, [`crate::testing::MockRetriever`] the scripted one for
/// tests.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Run one query in the given mode.
    ///
    /// `context_only = true` suppresses answer generation when only citation
    /// candidates are needed.
    async fn retrieve(
        &self,
        query: &str,
        mode: RetrievalMode,
        context_only: bool,
    ) -> Result<RetrievalResponse>;
}
