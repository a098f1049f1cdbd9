use std::path::{Path, PathBuf};

/// Classification of where a synthetic region came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Script text copied through from an original file.
    ScriptContent,
    /// Markup structure re-expressed in the synthetic output. Not a place
    /// where code completions are meaningful.
    TemplateEmbedding,
    /// Free markup text. No code-intelligence features apply here.
    TextContent,
    /// Glue emitted purely for the Analyzer's benefit; its original range is
    /// zero-length and results landing here are invisible to the user.
    SyntheticUsage,
}

impl SegmentKind {
    /// Whether a completion request landing in this kind of segment should
    /// reach the Analyzer at all.
    pub fn offers_completions(self) -> bool {
        !matches!(self, SegmentKind::TemplateEmbedding | SegmentKind::TextContent)
    }
}

/// The original-file range a segment was generated from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentOrigin {
    pub path: PathBuf,
    pub o_start: usize,
    pub o_end: usize,
}

/// One contiguous range correspondence between synthetic and original text.
///
/// `[t_start, t_end)` addresses the synthetic text. A segment without an
/// origin, or with an empty original range, represents text that exists only
/// in the synthetic output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingSegment {
    pub t_start: usize,
    pub t_end: usize,
    pub kind: SegmentKind,
    pub origin: Option<SegmentOrigin>,
}

impl MappingSegment {
    pub fn mapped(
        kind: SegmentKind,
        t_start: usize,
        t_end: usize,
        path: impl Into<PathBuf>,
        o_start: usize,
        o_end: usize,
    ) -> Self {
        Self {
            t_start,
            t_end,
            kind,
            origin: Some(SegmentOrigin {
                path: path.into(),
                o_start,
                o_end,
            }),
        }
    }

    /// Glue with no original counterpart.
    pub fn synthetic(t_start: usize, t_end: usize) -> Self {
        Self {
            t_start,
            t_end,
            kind: SegmentKind::SyntheticUsage,
            origin: None,
        }
    }

    /// Glue anchored to a zero-length point in an original file, so the
    /// Analyzer's results here can still name the owning file.
    pub fn synthetic_at(t_start: usize, t_end: usize, path: impl Into<PathBuf>, anchor: usize) -> Self {
        Self {
            t_start,
            t_end,
            kind: SegmentKind::SyntheticUsage,
            origin: Some(SegmentOrigin {
                path: path.into(),
                o_start: anchor,
                o_end: anchor,
            }),
        }
    }

    pub fn t_len(&self) -> usize {
        self.t_end - self.t_start
    }

    pub fn origin_path(&self) -> Option<&Path> {
        self.origin.as_ref().map(|o| o.path.as_path())
    }

    /// True when this segment has no user-visible counterpart.
    pub fn is_synthetic_only(&self) -> bool {
        match &self.origin {
            None => true,
            Some(origin) => origin.o_start == origin.o_end && self.t_len() > 0,
        }
    }
}
