//! Segment resolution - binding citation headers to real store segments.
//!
//! Resolution is tiered: exact start-time match first, integer segment id
//! second, any segment of the right video third, nothing last. It is a pure
//! read+match operation over a pre-fetched segment slice and is
//! deterministic for identical inputs.

use std::cmp::Ordering;
use tracing::warn;

use crate::types::citation::{CitationHeader, ResolutionTier, ResolvedCitation};
use crate::types::segment::Segment;

/// Resolve one header against the segments of its claimed video.
///
/// `segments` must already be scoped to `header.video_id`; callers fetch
/// per video and reuse the slice across headers. Tolerance bounds the
/// tier-1 time match (inclusive).
pub fn resolve_citation(
    header: CitationHeader,
    segments: &[Segment],
    tolerance_secs: f64,
) -> ResolvedCitation {
    // Tier 1: segment start within tolerance of the claimed start.
    // Closest delta wins; ties break on lowest segment id.
    let nearest = segments
        .iter()
        .filter(|s| (s.start_time - header.start).abs() <= tolerance_secs)
        .min_by(|a, b| {
            let delta_a = (a.start_time - header.start).abs();
            let delta_b = (b.start_time - header.start).abs();
            delta_a
                .partial_cmp(&delta_b)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.segment_id.cmp(&b.segment_id))
        });
    if let Some(segment) = nearest {
        let time_delta = (segment.start_time - header.start).abs();
        return ResolvedCitation::new(
            header,
            Some(segment.clone()),
            ResolutionTier::ExactTime,
            Some(time_delta),
        );
    }

    // Tier 2: exact integer segment id, when the raw form parses
    if let Some(id) = header.parse_segment_id() {
        if let Some(segment) = segments.iter().find(|s| s.segment_id == id) {
            return ResolvedCitation::new(
                header,
                Some(segment.clone()),
                ResolutionTier::BySegmentId,
                None,
            );
        }
    }

    // Tier 3: timing unrecoverable, bind to the video's first segment so
    // the citation still points at the right video. Tier 4: no segments.
    match segments.iter().min_by(|a, b| {
        a.start_time
            .partial_cmp(&b.start_time)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.segment_id.cmp(&b.segment_id))
    }) {
        Some(first) => {
            warn!(
                video_id = %header.video_id,
                header_start = header.start,
                "citation timing unrecoverable, falling back to first segment"
            );
            ResolvedCitation::new(
                header,
                Some(first.clone()),
                ResolutionTier::FallbackAnySegment,
                None,
            )
        }
        None => ResolvedCitation::unresolved(header),
    }
}
