//! Definition and references.
//!
//! Results can land in any synthetic module, so each span is translated
//! through the table of the module that reported it. A result whose
//! translated span is zero-length while its synthetic span was not marks a
//! purely synthetic usage and is dropped.

use tower_lsp_server::ls_types::{Location, Position, Uri};

use crate::analyzer::SpanInFile;

use super::LanguageService;

impl LanguageService {
    pub fn definition(&self, uri: &Uri, position: Position) -> Vec<Location> {
        self.spans_at(uri, position, |service, file, offset| {
            service.analyzer().definition_at(file, offset)
        })
    }

    pub fn references(&self, uri: &Uri, position: Position) -> Vec<Location> {
        self.spans_at(uri, position, |service, file, offset| {
            service.analyzer().references_at(file, offset)
        })
    }

    fn spans_at(
        &self,
        uri: &Uri,
        position: Position,
        query: impl Fn(&Self, &std::path::Path, usize) -> Vec<SpanInFile>,
    ) -> Vec<Location> {
        let Some(target) = self.resolve(uri) else {
            return Vec::new();
        };
        let Some(offset) = target.offset_at(position) else {
            return Vec::new();
        };
        let Some(t) = target.cached.table().to_synthetic(&target.path, offset) else {
            return Vec::new();
        };

        let spans = query(self, target.synthetic_path(), t);
        self.translate_spans(spans)
    }

    pub(crate) fn translate_spans(&self, spans: Vec<SpanInFile>) -> Vec<Location> {
        spans
            .into_iter()
            .filter_map(|span| {
                let original = self.engine().to_original(&span.file, span.start, span.end)?;
                // Synthetic-only artifact: non-empty in the synthetic text,
                // empty for the user.
                if original.start == original.end && span.end > span.start {
                    return None;
                }
                self.location_for(&original.path, original.start, original.end)
            })
            .collect()
    }
}
