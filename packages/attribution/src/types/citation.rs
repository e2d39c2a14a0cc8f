//! Citation types - from raw context markers to user-facing citations.
//!
//! A citation moves through three shapes: [`CitationHeader`] (parsed out of
//! raw retrieval context), [`ResolvedCitation`] (bound to a store segment,
//! or to none), and [`Citation`] (the display form with title and deep link).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::traits::retrieval::RetrievalMode;
use crate::types::segment::Segment;

/// A citation marker parsed from raw retrieval context.
///
/// Headers are ephemeral: created per query, never persisted. Their
/// timestamps come from the retrieval engine and may be imprecise, so they
/// are treated as claims to verify, not facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationHeader {
    /// Video id claimed by the marker
    pub video_id: String,

    /// Claimed start timestamp in seconds (may be imprecise)
    pub start: f64,

    /// Claimed end timestamp in seconds (may be imprecise)
    pub end: f64,

    /// Segment id in raw string form (may not parse to an integer)
    pub segment_id: String,

    /// Which retrieval mode produced the context this header came from
    pub source_mode: RetrievalMode,

    /// Text span immediately following the marker, used for lexical
    /// validation and as fallback citation text
    pub body_text: String,
}

impl CitationHeader {
    /// Create a new header.
    pub fn new(
        video_id: impl Into<String>,
        start: f64,
        end: f64,
        segment_id: impl Into<String>,
        source_mode: RetrievalMode,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            start,
            end,
            segment_id: segment_id.into(),
            source_mode,
            body_text: String::new(),
        }
    }

    /// Set the body text following the marker.
    pub fn with_body_text(mut self, body_text: impl Into<String>) -> Self {
        self.body_text = body_text.into();
        self
    }

    /// Segment id as an integer, if the raw form parses.
    pub fn parse_segment_id(&self) -> Option<i64> {
        self.segment_id.trim().parse::<i64>().ok()
    }
}

/// How a header was bound to a segment.
///
/// Ordered by confidence: the earlier the tier, the stronger the claim that
/// the cited timestamp is real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    /// Segment start matched the header start within tolerance
    ExactTime,
    /// Matched by integer segment id after time match failed
    BySegmentId,
    /// Timing unrecoverable; bound to the video's first segment so the
    /// citation still points at the right video
    FallbackAnySegment,
    /// The video has no retrievable segments
    Unresolved,
}

impl ResolutionTier {
    /// Stable snake_case name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionTier::ExactTime => "exact_time",
            ResolutionTier::BySegmentId => "by_segment_id",
            ResolutionTier::FallbackAnySegment => "fallback_any_segment",
            ResolutionTier::Unresolved => "unresolved",
        }
    }

    /// Whether a segment was resolved at all.
    pub fn is_found(&self) -> bool {
        !matches!(self, ResolutionTier::Unresolved)
    }

    /// Whether the resolved segment actually agrees with the header.
    /// Fallback resolution never counts as matching.
    pub fn matches_header(&self) -> bool {
        matches!(self, ResolutionTier::ExactTime | ResolutionTier::BySegmentId)
    }
}

impl fmt::Display for ResolutionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A header bound to a concrete segment (or to none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCitation {
    /// The original header
    pub header: CitationHeader,

    /// The segment it resolved to, if any
    pub segment: Option<Segment>,

    /// Which tier produced the binding
    pub tier: ResolutionTier,

    /// Absolute seconds between header start and segment start.
    /// Only set for exact-time resolution.
    pub time_delta: Option<f64>,
}

impl ResolvedCitation {
    /// Create a resolved citation.
    pub fn new(
        header: CitationHeader,
        segment: Option<Segment>,
        tier: ResolutionTier,
        time_delta: Option<f64>,
    ) -> Self {
        Self {
            header,
            segment,
            tier,
            time_delta,
        }
    }

    /// A citation whose video had no segments at all.
    pub fn unresolved(header: CitationHeader) -> Self {
        Self {
            header,
            segment: None,
            tier: ResolutionTier::Unresolved,
            time_delta: None,
        }
    }

    /// Whether a segment was resolved.
    pub fn is_found(&self) -> bool {
        self.tier.is_found()
    }

    /// Whether the resolved segment agrees with the header.
    pub fn matches_header(&self) -> bool {
        self.tier.matches_header()
    }
}

/// Lexical checks of a resolved citation against the user's query.
///
/// These are cheap, explainable guards against presenting a wrong timestamp
/// as truth; no model call is involved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// A segment was resolved
    pub is_found: bool,

    /// The resolved segment agrees with the header (time or id)
    pub matches_header: bool,

    /// Fraction of query keywords present in the segment text (0.0 to 1.0)
    pub keyword_overlap_score: f64,

    /// A capitalized-name sequence from the query appears verbatim in the
    /// segment text
    pub entity_overlap: bool,
}

/// A user-facing citation: video, timestamp, text, deep link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    /// Video the citation points at
    pub video_id: String,

    /// Display title of the video
    pub video_title: String,

    /// Timestamp in seconds the citation points at
    pub timestamp: f64,

    /// Cited transcript text (bounded length)
    pub text: String,

    /// Deep link to the video at the timestamp
    pub url: String,
}

/// The primary answer contract: generated answer plus ordered citations.
///
/// The answer always renders; citations are strictly additive and may be
/// empty when nothing resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributedAnswer {
    /// Generated natural-language answer
    pub answer: String,

    /// Accepted citations, best first
    pub citations: Vec<Citation>,
}

impl AttributedAnswer {
    /// Create an attributed answer.
    pub fn new(answer: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            answer: answer.into(),
            citations,
        }
    }

    /// An answer with no citations.
    pub fn uncited(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            citations: Vec::new(),
        }
    }
}
