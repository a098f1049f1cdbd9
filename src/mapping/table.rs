//! The ordered segment table and its offset queries.
//!
//! Invariants enforced at construction: segments sorted by `t_start`, each
//! with positive synthetic length, contiguous and gapless from 0 to the
//! synthetic text length; per original file, mapped ranges do not overlap.
//!
//! Boundary tie-breaks (the behavior is deliberately asymmetric so spans
//! stay half-open in both coordinate spaces):
//! - a synthetic start offset on a segment boundary resolves to the
//!   following segment; a synthetic end offset resolves to the preceding one;
//! - an original offset on a boundary resolves to the later segment, except
//!   at the very end of a file's mapped region, where it resolves to the end
//!   of that region so end-of-file cursors still translate.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::mapping::segment::{MappingSegment, SegmentKind};

/// Ordered, gapless mapping between one synthetic text and its original
/// file(s).
#[derive(Debug)]
pub struct MappingTable {
    segments: Vec<MappingSegment>,
    /// Per original file: segment indices sorted by original start offset.
    by_origin: HashMap<PathBuf, Vec<usize>>,
    synthetic_len: usize,
}

/// Result of translating a synthetic span back to original coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OriginalSpan {
    pub path: PathBuf,
    pub start: usize,
    pub end: usize,
    /// Tag of the segment owning the span's start.
    pub kind: SegmentKind,
    /// The owning segment has no user-visible counterpart; results here are
    /// suppressed from user-facing output.
    pub synthetic_only: bool,
}

impl MappingTable {
    /// Validate the segment list against `synthetic_len` and build the
    /// per-file index.
    pub fn new(segments: Vec<MappingSegment>, synthetic_len: usize) -> CoreResult<Self> {
        let mut expected_start = 0;
        for (i, segment) in segments.iter().enumerate() {
            if segment.t_start != expected_start {
                return Err(CoreError::invalid_mapping(format!(
                    "segment {i} starts at {} but {} was expected",
                    segment.t_start, expected_start
                )));
            }
            if segment.t_end <= segment.t_start {
                return Err(CoreError::invalid_mapping(format!(
                    "segment {i} has no synthetic extent"
                )));
            }
            if let Some(origin) = &segment.origin
                && origin.o_end < origin.o_start
            {
                return Err(CoreError::invalid_mapping(format!(
                    "segment {i} has an inverted original range"
                )));
            }
            expected_start = segment.t_end;
        }
        if expected_start != synthetic_len {
            return Err(CoreError::invalid_mapping(format!(
                "segments cover [0, {expected_start}) but the synthetic text has length {synthetic_len}"
            )));
        }

        let mut by_origin: HashMap<PathBuf, Vec<usize>> = HashMap::new();
        for (i, segment) in segments.iter().enumerate() {
            if let Some(origin) = &segment.origin {
                by_origin.entry(origin.path.clone()).or_default().push(i);
            }
        }
        for indices in by_origin.values_mut() {
            indices.sort_by_key(|&i| {
                let origin = segments[i].origin.as_ref().unwrap();
                (origin.o_start, origin.o_end)
            });
            for pair in indices.windows(2) {
                let a = segments[pair[0]].origin.as_ref().unwrap();
                let b = segments[pair[1]].origin.as_ref().unwrap();
                if a.o_end > b.o_start {
                    return Err(CoreError::invalid_mapping(format!(
                        "original ranges [{}, {}) and [{}, {}) overlap in {}",
                        a.o_start,
                        a.o_end,
                        b.o_start,
                        b.o_end,
                        a.path.display()
                    )));
                }
            }
        }

        Ok(Self {
            segments,
            by_origin,
            synthetic_len,
        })
    }

    pub fn segments(&self) -> &[MappingSegment] {
        &self.segments
    }

    pub fn synthetic_len(&self) -> usize {
        self.synthetic_len
    }

    /// Files contributing at least one mapped segment.
    pub fn origin_paths(&self) -> impl Iterator<Item = &Path> {
        self.by_origin.keys().map(PathBuf::as_path)
    }

    /// Segment owning a synthetic start offset. An offset on a boundary
    /// belongs to the following segment; the end-of-text offset belongs to
    /// the last segment.
    pub fn segment_at_synthetic(&self, offset: usize) -> Option<&MappingSegment> {
        self.segment_index_at_synthetic(offset)
            .map(|i| &self.segments[i])
    }

    fn segment_index_at_synthetic(&self, offset: usize) -> Option<usize> {
        if self.segments.is_empty() || offset > self.synthetic_len {
            return None;
        }
        if offset == self.synthetic_len {
            return Some(self.segments.len() - 1);
        }
        let i = self.segments.partition_point(|s| s.t_start <= offset);
        Some(i - 1)
    }

    /// Translate an original offset into the synthetic text. Boundary
    /// ambiguity prefers the later segment; the end of a file's last mapped
    /// range translates to that range's synthetic end.
    pub fn to_synthetic(&self, path: &Path, offset: usize) -> Option<usize> {
        let indices = self.by_origin.get(path)?;
        let at_or_before = indices.partition_point(|&i| {
            self.segments[i].origin.as_ref().unwrap().o_start <= offset
        });

        let mut end_fallback = None;
        for &i in indices[..at_or_before].iter().rev() {
            let segment = &self.segments[i];
            let origin = segment.origin.as_ref().unwrap();
            if offset < origin.o_end {
                return Some(segment.t_start + (offset - origin.o_start));
            }
            if offset == origin.o_end && origin.o_end > origin.o_start && end_fallback.is_none() {
                end_fallback = Some(segment.t_start + (offset - origin.o_start));
            }
        }
        end_fallback
    }

    /// Translate a synthetic span `[start, end)` back to original
    /// coordinates.
    ///
    /// A span inside one segment translates linearly. A span crossing
    /// segments extends through following segments of the same origin file
    /// and clips where the origin file changes or the mapping ends. Returns
    /// `None` when the start lands in glue with no original anchor.
    pub fn to_original(&self, start: usize, end: usize) -> Option<OriginalSpan> {
        let end = end.max(start);
        let mut i = self.segment_index_at_synthetic(start)?;
        let mut start = start;

        // Skip unanchored glue when the span continues past it.
        while self.segments[i].origin.is_none()
            && self.segments[i].t_end < end
            && i + 1 < self.segments.len()
        {
            i += 1;
            start = self.segments[i].t_start;
        }

        let first = &self.segments[i];
        let origin = first.origin.as_ref()?;
        let o_start = (origin.o_start + (start.min(first.t_end) - first.t_start)).min(origin.o_end);

        // Walk forward through same-file segments until the span's end.
        let mut j = i;
        while end > self.segments[j].t_end {
            let Some(next) = self.segments.get(j + 1) else {
                break;
            };
            if next.origin_path() != Some(origin.path.as_path()) {
                break;
            }
            j += 1;
        }
        let last = &self.segments[j];
        let last_origin = last.origin.as_ref().unwrap();
        let o_end = if end <= last.t_end {
            (last_origin.o_start + (end.max(last.t_start) - last.t_start)).min(last_origin.o_end)
        } else {
            last_origin.o_end
        };

        Some(OriginalSpan {
            path: origin.path.clone(),
            start: o_start,
            end: o_end.max(o_start),
            kind: first.kind,
            synthetic_only: first.is_synthetic_only(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::segment::SegmentKind::*;
    use rstest::rstest;

    // ==========================================================================
    // Fixture: synthetic text "AAAA&&BBBB//CCCC" mapped to two files
    //   [0, 4)   script.ts [10, 14)   ScriptContent
    //   [4, 6)   glue, unanchored     SyntheticUsage
    //   [6, 10)  page.tpl  [2, 6)     ScriptContent
    //   [10, 12) glue anchored at page.tpl 6
    //   [12, 16) page.tpl  [8, 12)    TextContent
    // ==========================================================================

    fn table() -> MappingTable {
        MappingTable::new(
            vec![
                MappingSegment::mapped(ScriptContent, 0, 4, "/p/script.ts", 10, 14),
                MappingSegment::synthetic(4, 6),
                MappingSegment::mapped(ScriptContent, 6, 10, "/p/page.tpl", 2, 6),
                MappingSegment::synthetic_at(10, 12, "/p/page.tpl", 6),
                MappingSegment::mapped(TextContent, 12, 16, "/p/page.tpl", 8, 12),
            ],
            16,
        )
        .unwrap()
    }

    // ==========================================================================
    // Construction invariants
    // ==========================================================================

    #[test]
    fn rejects_gap_between_segments() {
        let err = MappingTable::new(
            vec![
                MappingSegment::mapped(ScriptContent, 0, 4, "/p/a.ts", 0, 4),
                MappingSegment::mapped(ScriptContent, 5, 8, "/p/a.ts", 5, 8),
            ],
            8,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_incomplete_coverage() {
        let err = MappingTable::new(
            vec![MappingSegment::mapped(ScriptContent, 0, 4, "/p/a.ts", 0, 4)],
            10,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_empty_synthetic_segment() {
        let err = MappingTable::new(
            vec![
                MappingSegment::mapped(ScriptContent, 0, 4, "/p/a.ts", 0, 4),
                MappingSegment::mapped(ScriptContent, 4, 4, "/p/a.ts", 4, 4),
            ],
            4,
        );
        assert!(err.is_err());
    }

    #[test]
    fn rejects_overlapping_original_ranges() {
        let err = MappingTable::new(
            vec![
                MappingSegment::mapped(ScriptContent, 0, 4, "/p/a.ts", 0, 4),
                MappingSegment::mapped(ScriptContent, 4, 8, "/p/a.ts", 2, 6),
            ],
            8,
        );
        assert!(err.is_err());
    }

    #[test]
    fn empty_table_covers_empty_text() {
        let table = MappingTable::new(Vec::new(), 0).unwrap();
        assert_eq!(table.segment_at_synthetic(0), None);
        assert_eq!(table.to_original(0, 0), None);
    }

    // ==========================================================================
    // Synthetic-offset lookup
    // ==========================================================================

    #[rstest]
    #[case(0, ScriptContent)]
    #[case(3, ScriptContent)]
    #[case(4, SyntheticUsage)] // boundary prefers the following segment
    #[case(6, ScriptContent)]
    #[case(12, TextContent)]
    #[case(16, TextContent)] // end-of-text belongs to the last segment
    fn synthetic_boundary_resolution(#[case] offset: usize, #[case] expected: SegmentKind) {
        let table = table();
        assert_eq!(table.segment_at_synthetic(offset).unwrap().kind, expected);
    }

    #[test]
    fn synthetic_offset_past_end_is_none() {
        assert!(table().segment_at_synthetic(17).is_none());
    }

    // ==========================================================================
    // Original -> synthetic
    // ==========================================================================

    #[test]
    fn original_offset_translates_linearly() {
        let table = table();
        assert_eq!(table.to_synthetic(Path::new("/p/script.ts"), 12), Some(2));
        assert_eq!(table.to_synthetic(Path::new("/p/page.tpl"), 3), Some(7));
    }

    #[test]
    fn original_boundary_prefers_later_segment() {
        // page.tpl offset 8 is the end of nothing and the start of the
        // TextContent range; it must resolve into that later segment.
        assert_eq!(table().to_synthetic(Path::new("/p/page.tpl"), 8), Some(12));
    }

    #[test]
    fn end_of_last_mapped_range_translates_to_its_synthetic_end() {
        assert_eq!(table().to_synthetic(Path::new("/p/script.ts"), 14), Some(4));
    }

    #[test]
    fn zero_length_anchor_never_captures_an_offset() {
        // page.tpl offset 6 ends the ScriptContent range and anchors the
        // glue; it must resolve to the script range's end, not into glue.
        assert_eq!(table().to_synthetic(Path::new("/p/page.tpl"), 6), Some(10));
    }

    #[test]
    fn unknown_file_or_unmapped_offset_is_none() {
        let table = table();
        assert_eq!(table.to_synthetic(Path::new("/p/other.ts"), 0), None);
        assert_eq!(table.to_synthetic(Path::new("/p/page.tpl"), 7), None);
        assert_eq!(table.to_synthetic(Path::new("/p/script.ts"), 2), None);
    }

    // ==========================================================================
    // Synthetic span -> original
    // ==========================================================================

    #[test]
    fn span_inside_one_segment_translates_linearly() {
        let span = table().to_original(1, 3).unwrap();
        assert_eq!(span.path, PathBuf::from("/p/script.ts"));
        assert_eq!((span.start, span.end), (11, 13));
        assert_eq!(span.kind, ScriptContent);
        assert!(!span.synthetic_only);
    }

    #[test]
    fn span_crossing_into_other_file_clips_at_file_change() {
        // [2, 8) starts in script.ts and reaches page.tpl; translation never
        // crosses the file change, so the span clips at the script range end.
        let span = table().to_original(2, 8).unwrap();
        assert_eq!(span.path, PathBuf::from("/p/script.ts"));
        assert_eq!((span.start, span.end), (12, 14));
    }

    #[test]
    fn span_extends_across_same_file_segments() {
        // [7, 14) spans the tpl script range, the anchored glue, and part of
        // the tpl text range; all one file, so the end maps proportionally
        // into the last segment.
        let span = table().to_original(7, 14).unwrap();
        assert_eq!(span.path, PathBuf::from("/p/page.tpl"));
        assert_eq!((span.start, span.end), (3, 10));
    }

    #[test]
    fn span_starting_in_unanchored_glue_skips_forward() {
        let span = table().to_original(4, 8).unwrap();
        assert_eq!(span.path, PathBuf::from("/p/page.tpl"));
        assert_eq!((span.start, span.end), (2, 4));
    }

    #[test]
    fn span_entirely_in_unanchored_glue_is_none() {
        assert!(table().to_original(4, 6).is_none());
        assert!(table().to_original(4, 5).is_none());
    }

    #[test]
    fn span_in_anchored_glue_is_zero_length_and_synthetic_only() {
        let span = table().to_original(10, 12).unwrap();
        assert_eq!((span.start, span.end), (6, 6));
        assert!(span.synthetic_only);
    }

    #[test]
    fn end_offset_on_boundary_stays_in_preceding_segment() {
        let span = table().to_original(6, 10).unwrap();
        assert_eq!(span.path, PathBuf::from("/p/page.tpl"));
        assert_eq!((span.start, span.end), (2, 6));
    }

    // ==========================================================================
    // Round-trip property
    // ==========================================================================

    #[test]
    fn round_trip_for_every_mapped_original_offset() {
        let table = table();
        for (path, range) in [
            ("/p/script.ts", 10..14),
            ("/p/page.tpl", 2..6),
            ("/p/page.tpl", 8..12),
        ] {
            for offset in range {
                let t = table.to_synthetic(Path::new(path), offset).unwrap();
                let span = table.to_original(t, t).unwrap();
                assert_eq!(span.path, PathBuf::from(path));
                assert_eq!(span.start, offset, "offset {offset} in {path}");
            }
        }
    }
}
