//! Storage trait for the transcript segment corpus.
//!
//! The store is the ground truth that citations are verified against. It is
//! read-only from this library's point of view: ingestion happens elsewhere.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::segment::Segment;

/// Read access to transcript segments and video metadata.
///
/// Implementations must return segments ordered by `(start_time, segment_id)`
/// ascending so resolution tie-breaking is deterministic.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SegmentStore: Send + Sync {
    /// All segments for one video, ordered by start time then segment id.
    ///
    /// An unknown video id is not an error: it returns an empty vec.
    async fn segments(&self, video_id: &str) -> Result<Vec<Segment>>;

    /// Display title for a video, if one is known.
    async fn video_title(&self, video_id: &str) -> Result<Option<String>>;
}
