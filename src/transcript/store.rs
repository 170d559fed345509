use std::collections::HashSet;

use super::segment::TranscriptSegment;

/// Ordered sequence of finalized transcript segments.
///
/// Single source of truth for display, notes generation and chat context.
/// Invariants: segments are kept sorted by `start`, segment ids are unique,
/// and the aggregate text is the space-joined text of all segments in order.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    segments: Vec<TranscriptSegment>,
    text: String,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    /// Space-joined text of all segments in start order.
    pub fn full_text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a single segment, keeping the sequence sorted by start time.
    /// Segments with an id already present are dropped.
    pub fn push(&mut self, segment: TranscriptSegment) {
        self.merge(vec![segment]);
    }

    /// Merge a batch of segments into the store.
    ///
    /// Segments whose id is already present are dropped (duplicate
    /// suppression across overlapping or retried chunk uploads), the full
    /// sequence is re-sorted by start time, and the aggregate text is
    /// recomputed. Returns the number of segments actually added.
    pub fn merge(&mut self, incoming: Vec<TranscriptSegment>) -> usize {
        let existing: HashSet<&str> = self.segments.iter().map(|s| s.id.as_str()).collect();
        let fresh: Vec<TranscriptSegment> = incoming
            .into_iter()
            .filter(|s| !existing.contains(s.id.as_str()))
            .collect();

        let added = fresh.len();
        if added == 0 {
            return 0;
        }

        self.segments.extend(fresh);
        self.segments.sort_by(|a, b| a.start.total_cmp(&b.start));
        self.recompute_text();
        added
    }

    /// Render the transcript for the notes and chat collaborators:
    /// each segment as `[timestamp] text`, newline-joined.
    pub fn render(&self) -> String {
        self.segments
            .iter()
            .map(|s| format!("[{}] {}", s.timestamp, s.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.text.clear();
    }

    fn recompute_text(&mut self) {
        self.text = self
            .segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
    }
}
