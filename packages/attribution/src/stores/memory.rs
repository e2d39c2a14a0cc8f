//! In-memory segment storage for testing and embedded use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::Result;
use crate::traits::store::SegmentStore;
use crate::types::segment::Segment;

/// In-memory segment store.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart. Per-video segments are kept ordered by
/// `(start_time, segment_id)` on insert.
pub struct MemoryStore {
    segments: RwLock<HashMap<String, Vec<Segment>>>,
    titles: RwLock<HashMap<String, String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            segments: RwLock::new(HashMap::new()),
            titles: RwLock::new(HashMap::new()),
        }
    }

    /// Add one segment, keeping its video's list ordered.
    pub fn add_segment(&self, segment: Segment) {
        let mut segments = self.segments.write().unwrap();
        let list = segments.entry(segment.video_id.clone()).or_default();
        list.push(segment);
        list.sort_by(|a, b| {
            a.start_time
                .partial_cmp(&b.start_time)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.segment_id.cmp(&b.segment_id))
        });
    }

    /// Add several segments.
    pub fn add_segments(&self, segments: impl IntoIterator<Item = Segment>) {
        for segment in segments {
            self.add_segment(segment);
        }
    }

    /// Set the display title for a video.
    pub fn set_title(&self, video_id: impl Into<String>, title: impl Into<String>) {
        self.titles
            .write()
            .unwrap()
            .insert(video_id.into(), title.into());
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.segments.write().unwrap().clear();
        self.titles.write().unwrap().clear();
    }

    /// Get the number of stored segments, across all videos.
    pub fn segment_count(&self) -> usize {
        self.segments.read().unwrap().values().map(Vec::len).sum()
    }

    /// Get the number of videos with at least one segment.
    pub fn video_count(&self) -> usize {
        self.segments.read().unwrap().len()
    }
}

#[async_trait]
impl SegmentStore for MemoryStore {
    async fn segments(&self, video_id: &str) -> Result<Vec<Segment>> {
        Ok(self
            .segments
            .read()
            .unwrap()
            .get(video_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn video_title(&self, video_id: &str) -> Result<Option<String>> {
        Ok(self.titles.read().unwrap().get(video_id).cloned())
    }
}
