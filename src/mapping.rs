//! Bidirectional offset mapping between synthetic and original text.

pub mod segment;
pub mod table;

pub use segment::{MappingSegment, SegmentKind, SegmentOrigin};
pub use table::{MappingTable, OriginalSpan};
