//! Diagnostics report types - the operator audit trail for one query.
//!
//! The report is read-only with respect to every other component and is
//! never shown to end users: it carries raw retrieval internals and segment
//! text from any video the RAG engine indexed, regardless of the caller's
//! access rights.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traits::retrieval::RetrievalMode;
use crate::types::citation::{Citation, CitationHeader, ResolutionTier, ValidationResult};

/// One resolved citation with its validation, as shown to an operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentValidation {
    /// Video the header claimed
    pub video_id: String,

    /// Resolved segment id, if a segment was bound
    pub segment_id: Option<i64>,

    /// Retrieval mode the header came from
    pub source_mode: RetrievalMode,

    /// Resolution tier
    pub tier: ResolutionTier,

    /// Seconds between header start and segment start (exact-time only)
    pub time_delta: Option<f64>,

    /// Bounded preview of the resolved segment text (empty if unresolved)
    pub segment_text: String,

    /// Lexical validation against the query
    pub validation: ValidationResult,
}

/// A segment found by scanning the store for query keywords.
///
/// Store matches answer the operator question "what did the corpus actually
/// say about this query", independent of what the retrieval engine cited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMatch {
    /// Video the segment belongs to
    pub video_id: String,

    /// Segment id
    pub segment_id: i64,

    /// Segment start in seconds
    pub start_time: f64,

    /// Bounded preview of the segment text
    pub text: String,

    /// Whether some extracted header starts near this segment, i.e. the
    /// retrieval engine cited this part of the video
    pub near_header: bool,
}

/// Summary counts for one query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Headers extracted from vector-mode context
    pub vector_header_count: usize,

    /// Headers extracted from graph-mode context
    pub graph_header_count: usize,

    /// Markers that failed to parse (across both modes)
    pub malformed_header_count: usize,

    /// Resolved citations with a bound segment
    pub found_count: usize,

    /// Resolved citations whose segment agrees with the header
    pub matches_header_count: usize,

    /// Citations in the final accepted list
    pub citation_count: usize,
}

/// Everything an operator needs to audit one query end to end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticsReport {
    /// Generated id for operator correlation
    pub report_id: Uuid,

    /// When the report was assembled
    pub created_at: DateTime<Utc>,

    /// The user query
    pub query: String,

    /// The generated answer
    pub answer: String,

    /// Bounded preview of the raw vector-mode context
    pub vector_context_preview: String,

    /// Bounded preview of the raw graph-mode context
    pub graph_context_preview: String,

    /// Error message if the vector-mode call failed
    pub vector_error: Option<String>,

    /// Error message if the graph-mode call failed
    pub graph_error: Option<String>,

    /// Headers extracted from vector-mode context (bounded)
    pub vector_headers: Vec<CitationHeader>,

    /// Headers extracted from graph-mode context (bounded)
    pub graph_headers: Vec<CitationHeader>,

    /// Every resolved citation with its validation (bounded)
    pub validations: Vec<SegmentValidation>,

    /// Keyword matches scanned directly from the store (bounded)
    pub store_matches: Vec<StoreMatch>,

    /// The final accepted citation list, as returned to the caller
    pub citations: Vec<Citation>,

    /// Summary counts
    pub summary: ReportSummary,
}
