//! Diagnostics assembly - turning one query's pipeline trace into a
//! bounded, serializable report.
//!
//! Everything here is read-only with respect to the rest of the pipeline.
//! Bounds keep the payload small; summary counts are taken before bounding
//! so they reflect the full picture.

use chrono::Utc;
use indexmap::IndexMap;
use uuid::Uuid;

use crate::pipeline::validate::query_keywords;
use crate::types::citation::{Citation, CitationHeader, ResolvedCitation, ValidationResult};
use crate::types::config::AttributionConfig;
use crate::types::report::{DiagnosticsReport, ReportSummary, SegmentValidation, StoreMatch};
use crate::types::segment::Segment;

/// How close (seconds) a header start must be to a segment start for the
/// store scan to consider the segment "cited".
const HEADER_PROXIMITY_SECS: f64 = 5.0;

/// Everything the pipeline gathered for one query, before bounding.
#[derive(Debug)]
pub(crate) struct QueryTrace {
    pub query: String,
    pub answer: String,
    pub vector_context: String,
    pub graph_context: String,
    pub vector_error: Option<String>,
    pub graph_error: Option<String>,
    pub vector_headers: Vec<CitationHeader>,
    pub graph_headers: Vec<CitationHeader>,
    pub malformed_count: usize,
    pub validated: Vec<(ResolvedCitation, ValidationResult)>,
    pub citations: Vec<Citation>,
}

/// Assemble the operator report from a trace.
pub(crate) fn build_report(
    trace: QueryTrace,
    store_matches: Vec<StoreMatch>,
    config: &AttributionConfig,
) -> DiagnosticsReport {
    let summary = ReportSummary {
        vector_header_count: trace.vector_headers.len(),
        graph_header_count: trace.graph_headers.len(),
        malformed_header_count: trace.malformed_count,
        found_count: trace
            .validated
            .iter()
            .filter(|(resolved, _)| resolved.is_found())
            .count(),
        matches_header_count: trace
            .validated
            .iter()
            .filter(|(resolved, _)| resolved.matches_header())
            .count(),
        citation_count: trace.citations.len(),
    };

    let validations: Vec<SegmentValidation> = trace
        .validated
        .iter()
        .take(config.max_validation_entries)
        .map(|(resolved, validation)| SegmentValidation {
            video_id: resolved.header.video_id.clone(),
            segment_id: resolved.segment.as_ref().map(|s| s.segment_id),
            source_mode: resolved.header.source_mode,
            tier: resolved.tier,
            time_delta: resolved.time_delta,
            segment_text: resolved
                .segment
                .as_ref()
                .map(|s| truncate_chars(&s.text, config.segment_preview_chars).to_string())
                .unwrap_or_default(),
            validation: validation.clone(),
        })
        .collect();

    DiagnosticsReport {
        report_id: Uuid::new_v4(),
        created_at: Utc::now(),
        query: trace.query,
        answer: trace.answer,
        vector_context_preview: truncate_chars(&trace.vector_context, config.context_preview_chars)
            .to_string(),
        graph_context_preview: truncate_chars(&trace.graph_context, config.context_preview_chars)
            .to_string(),
        vector_error: trace.vector_error,
        graph_error: trace.graph_error,
        vector_headers: bounded(trace.vector_headers, config.max_headers_per_mode),
        graph_headers: bounded(trace.graph_headers, config.max_headers_per_mode),
        validations,
        store_matches,
        citations: trace.citations,
        summary,
    }
}

/// Scan the already-fetched segments for query keywords.
///
/// Answers the operator question "what does the corpus actually say about
/// this query", independent of what the retrieval engine cited. Each match
/// notes whether some header start lies near the segment, i.e. whether the
/// engine cited that part of the video at all.
pub(crate) fn scan_store_matches(
    trace: &QueryTrace,
    segments_by_video: &IndexMap<String, Vec<Segment>>,
    config: &AttributionConfig,
) -> Vec<StoreMatch> {
    let keywords = query_keywords(&trace.query);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    'scan: for (video_id, segments) in segments_by_video {
        for segment in segments {
            let text_lower = segment.text.to_lowercase();
            if !keywords.iter().any(|k| text_lower.contains(k.as_str())) {
                continue;
            }

            let near_header = trace
                .vector_headers
                .iter()
                .chain(trace.graph_headers.iter())
                .any(|header| {
                    header.video_id == *video_id
                        && (header.start - segment.start_time).abs() <= HEADER_PROXIMITY_SECS
                });

            matches.push(StoreMatch {
                video_id: video_id.clone(),
                segment_id: segment.segment_id,
                start_time: segment.start_time,
                text: truncate_chars(&segment.text, config.segment_preview_chars).to_string(),
                near_header,
            });
            if matches.len() >= config.max_store_matches {
                break 'scan;
            }
        }
    }
    matches
}

fn bounded<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    items.truncate(max);
    items
}

/// Cap a string at `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::retrieval::RetrievalMode;
    use crate::types::citation::ResolutionTier;

    fn header(video_id: &str, start: f64) -> CitationHeader {
        CitationHeader::new(video_id, start, start + 5.0, "1", RetrievalMode::Vector)
    }

    fn trace_with(
        vector_headers: Vec<CitationHeader>,
        validated: Vec<(ResolvedCitation, ValidationResult)>,
    ) -> QueryTrace {
        QueryTrace {
            query: "hvem er Morten Thorvaldsen".to_string(),
            answer: "Morten er...".to_string(),
            vector_context: "context".to_string(),
            graph_context: String::new(),
            vector_error: None,
            graph_error: None,
            vector_headers,
            graph_headers: vec![],
            malformed_count: 0,
            validated,
            citations: vec![],
        }
    }

    #[test]
    fn test_summary_counts_taken_before_bounding() {
        let headers: Vec<CitationHeader> = (0..15).map(|i| header("v1", i as f64)).collect();
        let mut trace = trace_with(headers, vec![]);
        trace.malformed_count = 2;

        let report = build_report(trace, vec![], &AttributionConfig::default());

        assert_eq!(report.summary.vector_header_count, 15);
        assert_eq!(report.summary.malformed_header_count, 2);
        assert_eq!(report.vector_headers.len(), 10); // bounded
    }

    #[test]
    fn test_context_preview_bounded() {
        let mut trace = trace_with(vec![], vec![]);
        trace.vector_context = "x".repeat(5000);

        let report = build_report(trace, vec![], &AttributionConfig::default());
        assert_eq!(report.vector_context_preview.chars().count(), 1000);
    }

    #[test]
    fn test_unresolved_validation_entry() {
        let resolved = ResolvedCitation::unresolved(header("v2", 10.0));
        let validation = ValidationResult::default();
        let trace = trace_with(vec![], vec![(resolved, validation)]);

        let report = build_report(trace, vec![], &AttributionConfig::default());

        assert_eq!(report.validations.len(), 1);
        let entry = &report.validations[0];
        assert_eq!(entry.tier, ResolutionTier::Unresolved);
        assert!(entry.segment_id.is_none());
        assert!(entry.segment_text.is_empty());
        assert_eq!(report.summary.found_count, 0);
    }

    #[test]
    fn test_store_scan_flags_proximity() {
        let trace = trace_with(vec![header("v1", 12.0)], vec![]);
        let mut segments_by_video = IndexMap::new();
        segments_by_video.insert(
            "v1".to_string(),
            vec![
                // within 5s of the header start
                Segment::new("v1", 1, 10.0, 14.0, "Morten snakker her"),
                // far from any header
                Segment::new("v1", 9, 300.0, 305.0, "Thorvaldsen igjen"),
                // no keyword hit at all
                Segment::new("v1", 10, 400.0, 405.0, "uten treff"),
            ],
        );

        let matches =
            scan_store_matches(&trace, &segments_by_video, &AttributionConfig::default());

        assert_eq!(matches.len(), 2);
        assert!(matches[0].near_header);
        assert_eq!(matches[0].segment_id, 1);
        assert!(!matches[1].near_header);
        assert_eq!(matches[1].segment_id, 9);
    }

    #[test]
    fn test_store_scan_respects_cap() {
        let trace = trace_with(vec![], vec![]);
        let segments: Vec<Segment> = (0..50)
            .map(|i| Segment::new("v1", i, i as f64 * 10.0, i as f64 * 10.0 + 5.0, "Morten"))
            .collect();
        let mut segments_by_video = IndexMap::new();
        segments_by_video.insert("v1".to_string(), segments);

        let matches =
            scan_store_matches(&trace, &segments_by_video, &AttributionConfig::default());
        assert_eq!(matches.len(), 20);
    }

    #[test]
    fn test_store_scan_empty_without_keywords() {
        let mut trace = trace_with(vec![], vec![]);
        trace.query = "hva er det".to_string(); // all stopwords

        let mut segments_by_video = IndexMap::new();
        segments_by_video.insert(
            "v1".to_string(),
            vec![Segment::new("v1", 1, 0.0, 5.0, "hva som helst")],
        );

        let matches =
            scan_store_matches(&trace, &segments_by_video, &AttributionConfig::default());
        assert!(matches.is_empty());
    }
}
