//! Transcript data model
//!
//! `TranscriptSegment` is the unit of finalized transcription;
//! `TranscriptStore` is the ordered, de-duplicated sequence of segments
//! that display, notes generation and chat all read from.

mod segment;
mod store;

pub use segment::{format_timestamp, TranscriptSegment};
pub use store::TranscriptStore;
