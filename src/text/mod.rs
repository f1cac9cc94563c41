pub mod segment;

pub use segment::{segment, word_count, Origin, Segment, SegmentMode};
