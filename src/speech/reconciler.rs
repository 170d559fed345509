use tracing::debug;

use super::recognizer::RecognitionEvent;
use crate::transcript::TranscriptSegment;

/// Estimated duration of a live segment; the recognizer reports no
/// per-utterance end times, so live segments use the same short estimate
/// the transcription endpoint applies to text-only responses.
const LIVE_SEGMENT_ESTIMATE_SECS: f64 = 2.0;

/// Reconciles the overlapping, partially duplicated output of a continuous
/// speech recognizer into clean timestamped segments.
///
/// Recognizers re-emit a growing utterance rather than a true delta, so a
/// new final result often contains everything already flushed plus a small
/// new suffix. The reconciler keeps the latest final text (overwriting, not
/// concatenating), concatenates interim text for display only, and on each
/// flush strips everything up to and including the previously flushed text
/// before committing the remainder.
#[derive(Debug, Default)]
pub struct LiveSpeechReconciler {
    /// Latest final text seen since the previous flush.
    pending_final: String,
    /// Concatenated interim text, display-only until a flush falls back
    /// to it.
    interim: String,
    /// Last text committed to the transcript, used to strip re-emitted
    /// prefixes.
    last_flushed: String,
    next_segment_id: u64,
}

impl LiveSpeechReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all transient state. Called on every session start.
    pub fn reset(&mut self) {
        self.pending_final.clear();
        self.interim.clear();
        self.last_flushed.clear();
        self.next_segment_id = 0;
    }

    /// Consume a recognition event, separating the newly reported result
    /// range into final text (latest wins) and interim text (concatenated).
    pub fn handle_event(&mut self, event: &RecognitionEvent) {
        let mut current_interim = String::new();

        for result in event.results.iter().skip(event.result_index) {
            if result.is_final {
                debug!("Final result: {:?}", result.text);
                self.pending_final = result.text.clone();
            } else {
                current_interim.push_str(&result.text);
            }
        }

        if !current_interim.is_empty() {
            self.interim = current_interim;
        }
    }

    /// Current interim text for display. Never stored in the transcript
    /// unless a flush has to fall back to it.
    pub fn interim_text(&self) -> &str {
        &self.interim
    }

    /// Commit pending text as a new segment timestamped at `elapsed_secs`.
    ///
    /// Prefers final text; falls back to interim so a long unfinished
    /// utterance is never silently dropped. Returns `None` when there is
    /// nothing new to add, which makes back-to-back flushes idempotent.
    pub fn flush(&mut self, elapsed_secs: f64) -> Option<TranscriptSegment> {
        let mut text = if !self.pending_final.trim().is_empty() {
            let text = self.pending_final.trim().to_string();
            self.pending_final.clear();
            text
        } else if !self.interim.trim().is_empty() {
            self.interim.trim().to_string()
        } else {
            return None;
        };

        // The recognizer re-emits grown utterances; keep only the suffix
        // beyond what was already flushed.
        if !self.last_flushed.is_empty() {
            if let Some(pos) = text.find(&self.last_flushed) {
                let suffix = text[pos + self.last_flushed.len()..].trim().to_string();
                if suffix.is_empty() {
                    debug!("No new content beyond last flush, skipping");
                    return None;
                }
                text = suffix;
            }
        }

        self.last_flushed = text.clone();
        self.interim.clear();

        let id = format!("live-{}", self.next_segment_id);
        self.next_segment_id += 1;

        Some(TranscriptSegment::new(
            id,
            elapsed_secs,
            elapsed_secs + LIVE_SEGMENT_ESTIMATE_SECS,
            text,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::recognizer::RecognitionResult;

    fn event(result_index: usize, results: &[(&str, bool)]) -> RecognitionEvent {
        RecognitionEvent {
            result_index,
            results: results
                .iter()
                .map(|(text, is_final)| RecognitionResult {
                    text: text.to_string(),
                    is_final: *is_final,
                })
                .collect(),
        }
    }

    #[test]
    fn flush_commits_final_text_with_timestamp() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("the cell has a nucleus", true)]));

        let segment = reconciler.flush(3.0).expect("segment");
        assert_eq!(segment.text, "the cell has a nucleus");
        assert_eq!(segment.timestamp, "0:03");
    }

    #[test]
    fn flush_is_idempotent_without_new_events() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("hello world", true)]));

        assert!(reconciler.flush(1.0).is_some());
        assert!(
            reconciler.flush(2.0).is_none(),
            "second flush with no new events must be a no-op"
        );
    }

    #[test]
    fn flush_strips_previously_flushed_prefix() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("hello wor", true)]));
        let first = reconciler.flush(1.0).unwrap();
        assert_eq!(first.text, "hello wor");

        reconciler.handle_event(&event(0, &[("hello world", true)]));
        let second = reconciler.flush(6.0).unwrap();
        assert_eq!(second.text, "ld");
    }

    #[test]
    fn flush_skips_when_nothing_beyond_last_flush() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("repeated phrase", true)]));
        assert!(reconciler.flush(1.0).is_some());

        // Recognizer re-emits the identical utterance as final again.
        reconciler.handle_event(&event(0, &[("repeated phrase", true)]));
        assert!(reconciler.flush(6.0).is_none());
    }

    #[test]
    fn latest_final_overwrites_not_concatenates() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("first attempt", true)]));
        reconciler.handle_event(&event(0, &[("first attempt revised", true)]));

        let segment = reconciler.flush(2.0).unwrap();
        assert_eq!(segment.text, "first attempt revised");
    }

    #[test]
    fn flush_falls_back_to_interim_text() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("a long unfinished utterance", false)]));
        assert_eq!(reconciler.interim_text(), "a long unfinished utterance");

        let segment = reconciler.flush(5.0).unwrap();
        assert_eq!(segment.text, "a long unfinished utterance");
        assert_eq!(
            reconciler.interim_text(),
            "",
            "interim display state clears on flush"
        );
    }

    #[test]
    fn only_new_result_range_is_consumed() {
        let mut reconciler = LiveSpeechReconciler::new();
        // Results before result_index were reported earlier and must be
        // ignored, or stale text would reappear.
        reconciler.handle_event(&event(
            1,
            &[("stale earlier result", true), ("fresh interim", false)],
        ));

        let segment = reconciler.flush(1.0).unwrap();
        assert_eq!(segment.text, "fresh interim");
    }

    #[test]
    fn interim_pieces_concatenate_within_an_event() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("part one ", false), ("part two", false)]));
        assert_eq!(reconciler.interim_text(), "part one part two");
    }

    #[test]
    fn segment_ids_are_unique_and_sequential() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("alpha", true)]));
        let a = reconciler.flush(1.0).unwrap();
        reconciler.handle_event(&event(0, &[("beta", true)]));
        let b = reconciler.flush(6.0).unwrap();

        assert_eq!(a.id, "live-0");
        assert_eq!(b.id, "live-1");
    }

    #[test]
    fn reset_clears_duplicate_tracking() {
        let mut reconciler = LiveSpeechReconciler::new();
        reconciler.handle_event(&event(0, &[("hello", true)]));
        assert!(reconciler.flush(1.0).is_some());

        reconciler.reset();
        reconciler.handle_event(&event(0, &[("hello", true)]));
        let segment = reconciler.flush(1.0).expect("same text is new after reset");
        assert_eq!(segment.text, "hello");
        assert_eq!(segment.id, "live-0");
    }
}
