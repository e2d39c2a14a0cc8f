//! Attribution pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Concurrent retrieval (vector-only + graph-augmented)
//! - Header extraction from both raw contexts
//! - Tiered segment resolution against the store
//! - Lexical validation against the query
//! - Aggregation (ranking, dedup, cap) into the final citation list
//! - Diagnostics assembly for the operator surface

pub mod aggregate;
pub mod diagnostics;
pub mod engine;
pub mod extract;
pub mod resolve;
pub mod validate;

pub use aggregate::{build_citation, select_citations};
pub use engine::AttributionEngine;
pub use extract::extract_headers;
pub use resolve::resolve_citation;
pub use validate::validate_citation;
