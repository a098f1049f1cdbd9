//! Text position utilities.
//!
//! Conversion between protocol positions (zero-based line + UTF-16 code unit
//! column) and byte offsets into UTF-8 document text.

pub mod position;

pub use position::{
    PositionMapper, SimplePositionMapper, compute_line_starts, offset_to_position,
    position_to_offset,
};
