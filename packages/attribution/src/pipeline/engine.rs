//! The AttributionEngine - main entry point for the attribution library.
//!
//! One query flows through: two concurrent retrievals (vector-only and
//! graph-augmented), header extraction from both raw contexts, tiered
//! resolution against the segment store, lexical validation, aggregation
//! into the final citation list. The same pipeline backs both the chat
//! surface (`answer_with_citations`) and the operator surface
//! (`debug_sources`).

use futures::future::join_all;
use indexmap::{IndexMap, IndexSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{AttributionError, Result};
use crate::pipeline::aggregate::{build_citation, select_citations};
use crate::pipeline::diagnostics::{build_report, scan_store_matches, QueryTrace};
use crate::pipeline::extract::extract_headers;
use crate::pipeline::resolve::resolve_citation;
use crate::pipeline::validate::validate_citation;
use crate::traits::retrieval::{RetrievalMode, RetrievalResponse, Retriever};
use crate::traits::store::SegmentStore;
use crate::types::citation::{AttributedAnswer, Citation, ResolvedCitation, ValidationResult};
use crate::types::config::AttributionConfig;
use crate::types::report::DiagnosticsReport;
use crate::types::segment::Segment;

/// The main entry point - recovers verified, timestamp-accurate citations
/// for answers produced by an external RAG engine.
///
/// # Example
///
/// ```rust,ignore
/// let store = MemoryStore::new();
/// let retriever = LightRagClient::new("http://localhost:9621")?;
/// let engine = AttributionEngine::new(store, retriever);
///
/// let result = engine.answer_with_citations("hvem er Morten?").await?;
/// for citation in &result.citations {
///     println!("{} @ {}s  {}", citation.video_title, citation.timestamp, citation.url);
/// }
/// ```
pub struct AttributionEngine<S: SegmentStore, R: Retriever> {
    store: S,
    retriever: R,
    config: AttributionConfig,
}

/// What one pipeline run produced: the full trace plus the segment
/// snapshot it resolved against (reused by the diagnostics store scan).
struct PipelineOutcome {
    trace: QueryTrace,
    segments_by_video: IndexMap<String, Vec<Segment>>,
}

impl<S: SegmentStore, R: Retriever> AttributionEngine<S, R> {
    /// Create a new engine with default configuration.
    pub fn new(store: S, retriever: R) -> Self {
        Self {
            store,
            retriever,
            config: AttributionConfig::default(),
        }
    }

    /// Create with custom configuration.
    pub fn with_config(store: S, retriever: R, config: AttributionConfig) -> Self {
        Self {
            store,
            retriever,
            config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &AttributionConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut AttributionConfig {
        &mut self.config
    }

    /// Get a reference to the segment store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get a reference to the retriever.
    pub fn retriever(&self) -> &R {
        &self.retriever
    }

    // =========================================================================
    // Primary Operations
    // =========================================================================

    /// Answer a query with verified citations.
    ///
    /// The answer always comes back, citations are strictly additive: if
    /// nothing resolves the list is empty, never fabricated. Only when both
    /// retrieval modes fail does the whole operation fail.
    pub async fn answer_with_citations(&self, query: &str) -> Result<AttributedAnswer> {
        let outcome = self.run_pipeline(query).await?;
        Ok(AttributedAnswer::new(
            outcome.trace.answer,
            outcome.trace.citations,
        ))
    }

    /// Like [`Self::answer_with_citations`] but abandons the in-flight
    /// retrieval calls when the token fires (e.g. client disconnect).
    /// Nothing is persisted, so cancellation leaves no partial state.
    pub async fn answer_with_citations_cancel(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> Result<AttributedAnswer> {
        tokio::select! {
            result = self.answer_with_citations(query) => result,
            _ = cancel.cancelled() => Err(AttributionError::Cancelled),
        }
    }

    /// Audit one query end to end: raw contexts, extracted headers, every
    /// resolution and validation, the store's own keyword matches, and the
    /// final citation list.
    ///
    /// Operator-only. The report contains unfiltered retrieval internals
    /// and segment text from any video the RAG engine indexed; never expose
    /// it to end users.
    pub async fn debug_sources(&self, query: &str) -> Result<DiagnosticsReport> {
        let outcome = self.run_pipeline(query).await?;
        let store_matches =
            scan_store_matches(&outcome.trace, &outcome.segments_by_video, &self.config);
        Ok(build_report(outcome.trace, store_matches, &self.config))
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    async fn run_pipeline(&self, query: &str) -> Result<PipelineOutcome> {
        if query.trim().is_empty() {
            return Err(AttributionError::InvalidQuery {
                reason: "query is empty".to_string(),
            });
        }

        debug!(query = %query, "running attribution pipeline");

        // The two retrieval calls are independent; issue them together
        let (vector_result, graph_result) = tokio::join!(
            self.retriever.retrieve(query, RetrievalMode::Vector, false),
            self.retriever.retrieve(query, RetrievalMode::Graph, false),
        );

        let (vector, vector_error) = degrade(vector_result, RetrievalMode::Vector);
        let (graph, graph_error) = degrade(graph_result, RetrievalMode::Graph);
        if vector.is_none() && graph.is_none() {
            return Err(AttributionError::RetrievalUnavailable {
                vector: vector_error.unwrap_or_else(|| "no response".to_string()),
                graph: graph_error.unwrap_or_else(|| "no response".to_string()),
            });
        }

        // Graph-augmented answers synthesize across segments and read
        // better; fall back to the vector answer when graph is out
        let answer = graph
            .as_ref()
            .map(|r| r.answer.as_str())
            .filter(|a| !a.trim().is_empty())
            .or_else(|| vector.as_ref().map(|r| r.answer.as_str()))
            .unwrap_or_default()
            .to_string();

        let vector_context = vector.map(|r| r.context).unwrap_or_default();
        let graph_context = graph.map(|r| r.context).unwrap_or_default();

        let (vector_headers, vector_malformed) =
            extract_headers(&vector_context, RetrievalMode::Vector);
        let (graph_headers, graph_malformed) =
            extract_headers(&graph_context, RetrievalMode::Graph);
        let malformed_count = vector_malformed + graph_malformed;

        // One store read per unique video, issued together; all headers
        // resolve against this snapshot. A failed lookup degrades that
        // video to unresolved rather than failing the answer.
        let video_ids: IndexSet<&str> = vector_headers
            .iter()
            .chain(graph_headers.iter())
            .map(|h| h.video_id.as_str())
            .collect();
        let lookups = video_ids
            .iter()
            .map(|&video_id| async move { (video_id, self.store.segments(video_id).await) });
        let results = join_all(lookups).await;

        let mut segments_by_video: IndexMap<String, Vec<Segment>> = IndexMap::new();
        for (video_id, result) in results {
            let segments = match result {
                Ok(segments) => segments,
                Err(e) => {
                    warn!(
                        video_id = %video_id,
                        error = %e,
                        "segment lookup failed, treating video as unresolved"
                    );
                    Vec::new()
                }
            };
            segments_by_video.insert(video_id.to_string(), segments);
        }

        // Vector headers first so equal-rank ties keep vector before graph
        let mut validated: Vec<(ResolvedCitation, ValidationResult)> =
            Vec::with_capacity(vector_headers.len() + graph_headers.len());
        for header in vector_headers.iter().chain(graph_headers.iter()) {
            let segments = segments_by_video
                .get(&header.video_id)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            let resolved =
                resolve_citation(header.clone(), segments, self.config.time_tolerance_secs);
            let validation = validate_citation(&resolved, query);
            validated.push((resolved, validation));
        }

        let selected = select_citations(query, &validated, &self.config);

        // Titles are display sugar: a failed lookup falls back to the
        // placeholder instead of failing the query
        let mut titles: IndexMap<String, Option<String>> = IndexMap::new();
        for resolved in &selected {
            let video_id = &resolved.header.video_id;
            if titles.contains_key(video_id) {
                continue;
            }
            let title = match self.store.video_title(video_id).await {
                Ok(title) => title,
                Err(e) => {
                    warn!(video_id = %video_id, error = %e, "title lookup failed");
                    None
                }
            };
            titles.insert(video_id.clone(), title);
        }

        let citations: Vec<Citation> = selected
            .iter()
            .map(|resolved| {
                let title = titles
                    .get(&resolved.header.video_id)
                    .and_then(|t| t.as_deref());
                build_citation(resolved, title, &self.config)
            })
            .collect();

        info!(
            vector_headers = vector_headers.len(),
            graph_headers = graph_headers.len(),
            malformed = malformed_count,
            citations = citations.len(),
            "attribution pipeline complete"
        );

        Ok(PipelineOutcome {
            trace: QueryTrace {
                query: query.to_string(),
                answer,
                vector_context,
                graph_context,
                vector_error,
                graph_error,
                vector_headers,
                graph_headers,
                malformed_count,
                validated,
                citations,
            },
            segments_by_video,
        })
    }
}

/// One failed mode degrades to a warning; the pipeline carries on with the
/// other. The error text is kept for diagnostics.
fn degrade(
    result: Result<RetrievalResponse>,
    mode: RetrievalMode,
) -> (Option<RetrievalResponse>, Option<String>) {
    match result {
        Ok(response) => (Some(response), None),
        Err(e) => {
            warn!(mode = %mode, error = %e, "retrieval failed, continuing without this mode");
            (None, Some(e.to_string()))
        }
    }
}
