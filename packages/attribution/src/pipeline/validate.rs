//! Citation validation - lexical checks against the user's query.
//!
//! The graph-augmented retrieval mode can synthesize an answer from several
//! segments and attach a header from a semantically similar but factually
//! unrelated one. These checks are a cheap, explainable guard against
//! presenting a wrong timestamp as truth; no model call is involved.

use indexmap::IndexSet;

use crate::types::citation::{ResolvedCitation, ValidationResult};

/// Norwegian and English function words excluded from keyword matching.
/// The corpus is largely Norwegian interview transcripts; generic words
/// like "jobb" match nearly every segment and carry no signal.
const STOPWORDS: &[&str] = &[
    "som", "det", "er", "og", "har", "kan", "for", "med", "den", "til", "der", "sitt", "sin",
    "sine", "han", "hun", "de", "en", "et", "på", "av", "ved", "om", "i", "jobb", "arbeid", "hva",
    "hvem", "hvor", "hvorfor", "hvordan", "når", "du", "deg", "din", "ditt", "meg", "seg", "oss",
    "dere", "jeg", "vi", "the", "and", "was", "are", "who", "what", "where", "when", "why", "how",
];

/// Validate one resolved citation against the query.
///
/// `is_found` and `matches_header` come straight from the resolution tier;
/// the overlap checks compare the resolved segment's text with the query.
pub fn validate_citation(resolved: &ResolvedCitation, query: &str) -> ValidationResult {
    let keywords = query_keywords(query);
    let entities = query_entities(query);

    let (keyword_overlap_score, entity_overlap) = match &resolved.segment {
        Some(segment) => {
            let text_lower = segment.text.to_lowercase();
            let matched = keywords
                .iter()
                .filter(|keyword| text_lower.contains(keyword.as_str()))
                .count();
            let score = if keywords.is_empty() {
                0.0
            } else {
                matched as f64 / keywords.len() as f64
            };
            // Entities match verbatim: names keep their capitalization in
            // transcript text, and case-folding would double the false hits
            let entity = entities
                .iter()
                .any(|entity| segment.text.contains(entity.as_str()));
            (score, entity)
        }
        None => (0.0, false),
    };

    ValidationResult {
        is_found: resolved.is_found(),
        matches_header: resolved.matches_header(),
        keyword_overlap_score,
        entity_overlap,
    }
}

/// Lowercased query words longer than 2 characters, stopwords removed,
/// deduplicated in first-seen order.
pub(crate) fn query_keywords(query: &str) -> Vec<String> {
    let mut keywords: IndexSet<String> = IndexSet::new();
    for word in query.split(|c: char| !c.is_alphanumeric()) {
        if word.chars().count() <= 2 {
            continue;
        }
        let lower = word.to_lowercase();
        if STOPWORDS.contains(&lower.as_str()) {
            continue;
        }
        keywords.insert(lower);
    }
    keywords.into_iter().collect()
}

/// Capitalized-word sequences from the query - a coarse proper-noun
/// heuristic ("Morten Thorvaldsen", "Oslo"). A capitalized word is one
/// uppercase char followed by one or more lowercase chars, Unicode-aware
/// so Æ/Ø/Å initials work.
pub(crate) fn query_entities(query: &str) -> Vec<String> {
    let mut entities = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for word in query.split_whitespace() {
        let token = word.trim_matches(|c: char| !c.is_alphanumeric());
        if is_capitalized(token) {
            current.push(token);
        } else if !current.is_empty() {
            entities.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        entities.push(current.join(" "));
    }

    entities
}

fn is_capitalized(token: &str) -> bool {
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_uppercase() {
        return false;
    }
    let mut rest = chars.peekable();
    rest.peek().is_some() && rest.all(|c| c.is_lowercase())
}
