//! Citation aggregation - ranking, deduplication, and the final cut.
//!
//! Takes every resolved+validated pair from both retrieval modes and
//! produces the ordered citation list the caller sees. Acceptance is
//! deliberately lenient (low keyword overlap does not drop a citation, it
//! only shows up in diagnostics); ranking and dedup do the real work.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::traits::retrieval::RetrievalMode;
use crate::types::citation::{Citation, ResolutionTier, ResolvedCitation, ValidationResult};
use crate::types::config::AttributionConfig;

/// Title shown when the store has no title for a video.
pub(crate) const UNTITLED_VIDEO: &str = "Untitled video";

/// Greetings and thanks in the corpus languages. A query made up of
/// nothing but these draws on no transcript content.
const GREETINGS: &[&str] = &[
    "hi", "hello", "hej", "hei", "hey", "hallo", "hola", "heisann", "der", "takk", "thanks",
    "thank", "you",
];

/// Select and order the citations for one query.
///
/// Policy: only pairs with a resolved segment are eligible;
/// `matches_header` ranks above fallback; vector before graph within equal
/// confidence; duplicates on `(video_id, segment_id)` keep the
/// higher-confidence entry; `top_k` truncates after ranking.
pub fn select_citations<'a>(
    query: &str,
    validated: &'a [(ResolvedCitation, ValidationResult)],
    config: &AttributionConfig,
) -> Vec<&'a ResolvedCitation> {
    if config.suppress_smalltalk && is_smalltalk(query) {
        debug!(query, "smalltalk query, suppressing all citations");
        return Vec::new();
    }

    let mut eligible: Vec<&(ResolvedCitation, ValidationResult)> = validated
        .iter()
        .filter(|(resolved, validation)| {
            validation.is_found
                && resolved.segment.is_some()
                && (validation.matches_header || config.promote_fallback)
        })
        .collect();

    // Stable sort keeps each mode's relevance order within equal rank
    eligible.sort_by_key(|(resolved, validation)| {
        let confidence = if validation.matches_header { 0u8 } else { 1 };
        let mode = match resolved.header.source_mode {
            RetrievalMode::Vector => 0u8,
            RetrievalMode::Graph => 1,
        };
        (confidence, mode)
    });

    let mut deduped: IndexMap<(String, i64), &ResolvedCitation> = IndexMap::new();
    for (resolved, _) in eligible {
        let Some(segment) = &resolved.segment else {
            continue;
        };
        deduped
            .entry((segment.video_id.clone(), segment.segment_id))
            .or_insert(resolved);
    }

    let selected: Vec<&ResolvedCitation> = deduped.into_values().take(config.top_k).collect();
    for resolved in &selected {
        if resolved.tier == ResolutionTier::FallbackAnySegment {
            warn!(
                video_id = %resolved.header.video_id,
                "promoting fallback-resolved citation with unverified timing"
            );
        }
    }
    selected
}

/// Build the user-facing citation from a resolved one.
///
/// Timestamp and text come from the resolved segment when present, falling
/// back to the header's claims otherwise (only reachable when a caller
/// bypasses [`select_citations`]).
pub fn build_citation(
    resolved: &ResolvedCitation,
    title: Option<&str>,
    config: &AttributionConfig,
) -> Citation {
    let (timestamp, text) = match &resolved.segment {
        Some(segment) => (segment.start_time, segment.text.as_str()),
        None => (resolved.header.start, resolved.header.body_text.as_str()),
    };

    Citation {
        video_id: resolved.header.video_id.clone(),
        video_title: title.unwrap_or(UNTITLED_VIDEO).to_string(),
        timestamp,
        text: truncate_with_ellipsis(text, config.citation_text_chars),
        url: format!(
            "{}/videos/{}?t={}",
            config.video_base_url, resolved.header.video_id, timestamp as u64
        ),
    }
}

/// True when the query is nothing but greetings or thanks.
pub(crate) fn is_smalltalk(query: &str) -> bool {
    let words: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    !words.is_empty() && words.len() <= 3 && words.iter().all(|w| GREETINGS.contains(&w.as_str()))
}

/// Cap a string at `max` characters, ellipsis-terminated only when cut.
fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
