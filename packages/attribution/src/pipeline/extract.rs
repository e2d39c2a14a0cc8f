//! Header extraction - parsing citation markers out of raw retrieval context.
//!
//! The retrieval engine embeds markers of the form
//! `[video_id=<id>;start=<num>;end=<num>;segment_id=<id>]` in its context
//! trace, each followed by the text span it covers. Extraction never fails:
//! malformed markers are dropped and counted, and the rest of the block
//! still parses.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use crate::traits::retrieval::RetrievalMode;
use crate::types::citation::CitationHeader;

/// Maximum characters of body text retained per header.
const BODY_TEXT_MAX_CHARS: usize = 500;

lazy_static! {
    // Anything that tries to be a citation marker, well-formed or not
    static ref MARKER_CANDIDATE: Regex = Regex::new(
        r"\[video_id=[^\]]*\]"
    ).unwrap();

    // A well-formed marker with all four fields in order
    static ref MARKER_STRICT: Regex = Regex::new(
        r"\[video_id=([^;\]]+);start=([^;\]]+);end=([^;\]]+);segment_id=([^\]]+)\]"
    ).unwrap();
}

/// Extract citation headers from one mode's raw context.
///
/// Headers come back in the order they appear, which is the retrieval
/// engine's relevance order and must be preserved. The second value is the
/// number of markers that failed to parse (malformed fields, negative or
/// non-finite timestamps); their blocks are dropped entirely.
pub fn extract_headers(context: &str, mode: RetrievalMode) -> (Vec<CitationHeader>, usize) {
    let candidates: Vec<_> = MARKER_CANDIDATE.find_iter(context).collect();
    let mut headers = Vec::with_capacity(candidates.len());
    let mut malformed = 0usize;

    for (i, candidate) in candidates.iter().enumerate() {
        let Some(caps) = MARKER_STRICT.captures(candidate.as_str()) else {
            malformed += 1;
            warn!(
                mode = %mode,
                marker = candidate.as_str(),
                "dropping malformed citation marker"
            );
            continue;
        };

        let (Some(start), Some(end)) = (parse_timestamp(&caps[2]), parse_timestamp(&caps[3]))
        else {
            malformed += 1;
            warn!(
                mode = %mode,
                marker = candidate.as_str(),
                "dropping citation marker with invalid timestamps"
            );
            continue;
        };

        let video_id = caps[1].trim();
        if video_id.is_empty() {
            malformed += 1;
            warn!(
                mode = %mode,
                marker = candidate.as_str(),
                "dropping citation marker with empty video id"
            );
            continue;
        }

        // Body runs from this marker to the next candidate (or end of input)
        let body_end = candidates
            .get(i + 1)
            .map(|next| next.start())
            .unwrap_or(context.len());
        let body = context[candidate.end()..body_end].trim();

        headers.push(
            CitationHeader::new(video_id, start, end, caps[4].trim(), mode)
                .with_body_text(truncate_chars(body, BODY_TEXT_MAX_CHARS)),
        );
    }

    (headers, malformed)
}

/// Parse a timestamp field. Integers and decimals are accepted; negative
/// and non-finite values are not (Rust parses "NaN" and "inf" as valid f64).
fn parse_timestamp(raw: &str) -> Option<f64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
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
    use proptest::prelude::*;

    #[test]
    fn test_extract_single_header_with_body() {
        let context =
            "[video_id=v1;start=235.0;end=240.0;segment_id=54] Mitt navn er Morten Thorvaldsen";
        let (headers, malformed) = extract_headers(context, RetrievalMode::Vector);

        assert_eq!(malformed, 0);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].video_id, "v1");
        assert_eq!(headers[0].start, 235.0);
        assert_eq!(headers[0].end, 240.0);
        assert_eq!(headers[0].segment_id, "54");
        assert_eq!(headers[0].source_mode, RetrievalMode::Vector);
        assert_eq!(headers[0].body_text, "Mitt navn er Morten Thorvaldsen");
    }

    #[test]
    fn test_extract_preserves_order() {
        let context = "\
            [video_id=v2;start=10;end=15;segment_id=3] second video text\n\
            [video_id=v1;start=0.5;end=4.25;segment_id=1] first video text";
        let (headers, _) = extract_headers(context, RetrievalMode::Graph);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].video_id, "v2");
        assert_eq!(headers[1].video_id, "v1");
        assert_eq!(headers[0].body_text, "second video text");
        assert_eq!(headers[1].body_text, "first video text");
    }

    #[test]
    fn test_integer_and_decimal_timestamps() {
        let context = "[video_id=v1;start=10;end=15.75;segment_id=3] text";
        let (headers, malformed) = extract_headers(context, RetrievalMode::Vector);

        assert_eq!(malformed, 0);
        assert_eq!(headers[0].start, 10.0);
        assert_eq!(headers[0].end, 15.75);
    }

    #[test]
    fn test_malformed_marker_dropped_and_counted() {
        // Missing end field entirely
        let context = "\
            [video_id=v1;start=10;segment_id=3] broken block\n\
            [video_id=v2;start=1;end=2;segment_id=4] good block";
        let (headers, malformed) = extract_headers(context, RetrievalMode::Vector);

        assert_eq!(malformed, 1);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].video_id, "v2");
    }

    #[test]
    fn test_negative_timestamp_rejected() {
        let context = "[video_id=v1;start=-5;end=2;segment_id=1] text";
        let (headers, malformed) = extract_headers(context, RetrievalMode::Vector);

        assert!(headers.is_empty());
        assert_eq!(malformed, 1);
    }

    #[test]
    fn test_non_finite_timestamp_rejected() {
        // f64::from_str happily parses these, so the finite check has to
        for bad in ["NaN", "inf", "infinity"] {
            let context = format!("[video_id=v1;start={bad};end=2;segment_id=1] text");
            let (headers, malformed) = extract_headers(&context, RetrievalMode::Vector);
            assert!(headers.is_empty(), "{bad} should be rejected");
            assert_eq!(malformed, 1);
        }
    }

    #[test]
    fn test_blank_video_id_rejected() {
        let context = "[video_id= ;start=1;end=2;segment_id=5] text";
        let (headers, malformed) = extract_headers(context, RetrievalMode::Vector);

        assert!(headers.is_empty());
        assert_eq!(malformed, 1);
    }

    #[test]
    fn test_non_numeric_segment_id_kept_raw() {
        let context = "[video_id=v1;start=1;end=2;segment_id=chunk-7] text";
        let (headers, malformed) = extract_headers(context, RetrievalMode::Vector);

        assert_eq!(malformed, 0);
        assert_eq!(headers[0].segment_id, "chunk-7");
        assert_eq!(headers[0].parse_segment_id(), None);
    }

    #[test]
    fn test_duplicates_kept_within_mode() {
        // Dedup is the aggregator's job, across modes
        let marker = "[video_id=v1;start=1;end=2;segment_id=5] same text\n";
        let context = format!("{marker}{marker}");
        let (headers, _) = extract_headers(&context, RetrievalMode::Vector);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_text_before_first_marker_ignored() {
        let context = "preamble from the engine\n[video_id=v1;start=1;end=2;segment_id=5] body";
        let (headers, _) = extract_headers(context, RetrievalMode::Vector);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].body_text, "body");
    }

    #[test]
    fn test_empty_context() {
        let (headers, malformed) = extract_headers("", RetrievalMode::Vector);
        assert!(headers.is_empty());
        assert_eq!(malformed, 0);
    }

    #[test]
    fn test_body_text_capped() {
        let long_body = "x".repeat(2000);
        let context = format!("[video_id=v1;start=1;end=2;segment_id=5] {long_body}");
        let (headers, _) = extract_headers(&context, RetrievalMode::Vector);
        assert_eq!(headers[0].body_text.chars().count(), BODY_TEXT_MAX_CHARS);
    }

    #[test]
    fn test_body_cap_respects_char_boundaries() {
        let long_body = "ø".repeat(2000);
        let context = format!("[video_id=v1;start=1;end=2;segment_id=5] {long_body}");
        let (headers, _) = extract_headers(&context, RetrievalMode::Vector);
        assert_eq!(headers[0].body_text.chars().count(), BODY_TEXT_MAX_CHARS);
    }

    proptest! {
        #[test]
        fn test_never_panics_on_arbitrary_input(input in ".{0,400}") {
            let (headers, malformed) = extract_headers(&input, RetrievalMode::Vector);
            // Every candidate marker is either parsed or counted malformed
            prop_assert!(headers.len() + malformed <= input.len() + 1);
        }

        #[test]
        fn test_extracted_timestamps_always_valid(
            video in "[a-z0-9]{1,8}",
            start in 0.0f64..100_000.0,
            end in 0.0f64..100_000.0,
            seg in 0i64..10_000,
        ) {
            let context = format!("[video_id={video};start={start};end={end};segment_id={seg}] body");
            let (headers, malformed) = extract_headers(&context, RetrievalMode::Graph);
            prop_assert_eq!(malformed, 0);
            prop_assert_eq!(headers.len(), 1);
            prop_assert!(headers[0].start.is_finite() && headers[0].start >= 0.0);
            prop_assert!(headers[0].end.is_finite() && headers[0].end >= 0.0);
        }
    }
}
