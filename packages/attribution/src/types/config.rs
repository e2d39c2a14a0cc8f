//! Configuration for the attribution pipeline.

use serde::{Deserialize, Serialize};

/// Default maximum number of citations returned per query.
pub const DEFAULT_TOP_K: usize = 5;

/// Default tolerance (seconds) for matching a header start against a
/// segment start.
pub const DEFAULT_TIME_TOLERANCE_SECS: f64 = 0.1;

/// Configuration for the attribution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// Maximum citations returned to the caller.
    ///
    /// The cap is applied after ranking so the best citations are never
    /// dropped by an early cutoff. Default: 5.
    pub top_k: usize,

    /// Tolerance in seconds when matching header start against segment
    /// start (inclusive). Default: 0.1.
    pub time_tolerance_secs: f64,

    /// Whether fallback-resolved citations may reach the final list.
    ///
    /// A fallback citation points at the right video but an arbitrary
    /// segment; it is ranked last and logged when promoted.
    /// Default: true.
    pub promote_fallback: bool,

    /// Drop all citations when the query is a bare greeting or thanks.
    ///
    /// The answer itself is never suppressed. Default: false.
    pub suppress_smalltalk: bool,

    /// Base URL for citation deep links (no trailing slash).
    ///
    /// Links render as `{base}/videos/{video_id}?t={seconds}`. An empty
    /// base yields relative links. Default: empty.
    pub video_base_url: String,

    /// Maximum characters of raw retrieval context kept per mode in
    /// diagnostics reports. Default: 1000.
    pub context_preview_chars: usize,

    /// Maximum headers listed per mode in diagnostics reports.
    ///
    /// Default: 10.
    pub max_headers_per_mode: usize,

    /// Maximum validation entries in diagnostics reports.
    ///
    /// Default: 20.
    pub max_validation_entries: usize,

    /// Maximum characters of segment text per diagnostics entry.
    ///
    /// Default: 200.
    pub segment_preview_chars: usize,

    /// Maximum store-scan matches in diagnostics reports.
    ///
    /// Default: 20.
    pub max_store_matches: usize,

    /// Maximum characters of segment text in a user-facing citation.
    ///
    /// Default: 200.
    pub citation_text_chars: usize,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            time_tolerance_secs: DEFAULT_TIME_TOLERANCE_SECS,
            promote_fallback: true,
            suppress_smalltalk: false,
            video_base_url: String::new(),
            context_preview_chars: 1000,
            max_headers_per_mode: 10,
            max_validation_entries: 20,
            segment_preview_chars: 200,
            max_store_matches: 20,
            citation_text_chars: 200,
        }
    }
}

impl AttributionConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the citation cap.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the time-match tolerance in seconds.
    pub fn with_time_tolerance_secs(mut self, tolerance: f64) -> Self {
        self.time_tolerance_secs = tolerance;
        self
    }

    /// Set whether fallback-resolved citations are promoted.
    pub fn with_promote_fallback(mut self, promote: bool) -> Self {
        self.promote_fallback = promote;
        self
    }

    /// Set whether smalltalk queries suppress citations.
    pub fn with_suppress_smalltalk(mut self, suppress: bool) -> Self {
        self.suppress_smalltalk = suppress;
        self
    }

    /// Set the deep-link base URL. A trailing slash is stripped.
    pub fn with_video_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.video_base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AttributionConfig::default();
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.time_tolerance_secs, DEFAULT_TIME_TOLERANCE_SECS);
        assert!(config.promote_fallback);
        assert!(!config.suppress_smalltalk);
        assert!(config.video_base_url.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let config = AttributionConfig::new().with_video_base_url("https://app.example.com/");
        assert_eq!(config.video_base_url, "https://app.example.com");
    }

    #[test]
    fn test_builders() {
        let config = AttributionConfig::new()
            .with_top_k(3)
            .with_promote_fallback(false)
            .with_suppress_smalltalk(true);
        assert_eq!(config.top_k, 3);
        assert!(!config.promote_fallback);
        assert!(config.suppress_smalltalk);
    }
}
