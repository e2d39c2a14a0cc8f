//! Source Attribution & Segment Validation Library
//!
//! Recovers trustworthy, timestamp-accurate citations for answers produced
//! by a RAG engine over video-transcript corpora. Retrieval mangles or
//! misattributes the metadata headers embedded in transcript chunks; this
//! library extracts those headers, re-validates every one against the
//! segment store, and only then turns them into user-facing citations.
//!
//! # Design Philosophy
//!
//! **"Never show a citation you cannot defend"**
//!
//! - Timestamps come from stored transcript segments, not from the LLM
//! - Every citation candidate is re-resolved against the store of record
//! - Degraded retrieval still answers; only total failure is an error
//! - Suspicious citations are flagged and explainable, not silently dropped
//! - Library handles attribution mechanics, app handles presentation
//!
//! # Usage
//!
//! ```rust,ignore
//! use attribution::{AttributionEngine, LightRagClient, MemoryStore, Segment};
//!
//! // Storage backend seeded from the transcript database
//! let store = MemoryStore::new();
//! store.add_segment(Segment::new("v1", 54, 234.9, 240.1, "jeg heter Morten"));
//! store.set_title("v1", "Intervju: Morten");
//!
//! // RAG engine boundary
//! let retriever = LightRagClient::new("http://localhost:9621")?;
//!
//! let engine = AttributionEngine::new(store, retriever);
//! let result = engine.answer_with_citations("hvem er Morten?").await?;
//! for citation in &result.citations {
//!     println!("{} @ {}s -> {}", citation.video_title, citation.timestamp, citation.url);
//! }
//!
//! // Operator-facing diagnostics for the same query
//! let report = engine.debug_sources("hvem er Morten?").await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (Retriever, SegmentStore)
//! - [`types`] - Citation, segment, and report data types
//! - [`pipeline`] - Extraction, resolution, validation, and aggregation
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`clients`] - Retriever implementations (LightRagClient)
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod clients;
pub mod error;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AttributionError, Result};
pub use traits::{
    retrieval::{RetrievalMode, RetrievalResponse, Retriever},
    store::SegmentStore,
};
pub use types::{
    citation::{
        AttributedAnswer, Citation, CitationHeader, ResolutionTier, ResolvedCitation,
        ValidationResult,
    },
    config::AttributionConfig,
    report::{DiagnosticsReport, ReportSummary, SegmentValidation, StoreMatch},
    segment::Segment,
};

// Re-export the engine from pipeline
pub use pipeline::AttributionEngine;

// Re-export pipeline components
pub use pipeline::{
    build_citation, extract_headers, resolve_citation, select_citations, validate_citation,
};

// Re-export stores
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;

// Re-export clients
pub use clients::LightRagClient;

// Re-export security types
pub use security::ApiKey;

// Re-export testing utilities
pub use testing::{MockRetriever, TestScenario};
