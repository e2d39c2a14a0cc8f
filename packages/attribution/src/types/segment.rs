//! Segment types - the transcript ground truth.

use serde::{Deserialize, Serialize};

/// One transcript segment of a video.
///
/// Segments are the smallest addressable unit of the corpus: a contiguous
/// stretch of speech with a start and end timestamp. Resolution verifies
/// citation headers against these records, never against retrieval output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Video this segment belongs to
    pub video_id: String,

    /// Segment id, unique within the video
    pub segment_id: i64,

    /// Start timestamp in seconds from the beginning of the video
    pub start_time: f64,

    /// End timestamp in seconds
    pub end_time: f64,

    /// Transcript text of the segment
    pub text: String,
}

impl Segment {
    /// Create a new segment.
    pub fn new(
        video_id: impl Into<String>,
        segment_id: i64,
        start_time: f64,
        end_time: f64,
        text: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            segment_id,
            start_time,
            end_time,
            text: text.into(),
        }
    }

    /// Duration of the segment in seconds.
    pub fn duration(&self) -> f64 {
        (self.end_time - self.start_time).max(0.0)
    }

    /// Whether a timestamp falls inside this segment (inclusive bounds).
    pub fn contains_time(&self, timestamp: f64) -> bool {
        timestamp >= self.start_time && timestamp <= self.end_time
    }
}
