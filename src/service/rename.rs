//! Rename: prepare and apply.
//!
//! Applied edits are grouped per original file and every group is stamped
//! with that file's current version at request time, so the client can
//! reject the edit if the document moved on.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tower_lsp_server::ls_types::{
    DocumentChanges, OneOf, OptionalVersionedTextDocumentIdentifier, Position, Range, TextDocumentEdit,
    TextEdit, Uri, WorkspaceEdit,
};

use crate::text::offset_to_position;
use crate::uri::path_to_uri;

use super::LanguageService;

impl LanguageService {
    /// Whether a rename can start here, and the exact range being renamed.
    pub fn rename_prepare(&self, uri: &Uri, position: Position) -> Option<Range> {
        let target = self.resolve(uri)?;
        let offset = target.offset_at(position)?;
        let t = target.cached.table().to_synthetic(&target.path, offset)?;

        let info = self.analyzer().rename_info_at(target.synthetic_path(), t)?;
        if !info.can_rename {
            return None;
        }

        let span = target
            .cached
            .table()
            .to_original(info.trigger_start, info.trigger_end)?;
        // The trigger span must surface in the document the user is editing.
        if span.path != target.path || span.synthetic_only {
            return None;
        }
        Some(Range {
            start: offset_to_position(&target.text, span.start)?,
            end: offset_to_position(&target.text, span.end)?,
        })
    }

    pub fn rename_apply(&self, uri: &Uri, position: Position, new_name: &str) -> Option<WorkspaceEdit> {
        let target = self.resolve(uri)?;
        let offset = target.offset_at(position)?;
        let t = target.cached.table().to_synthetic(&target.path, offset)?;

        let locations = self
            .analyzer()
            .rename_locations_at(target.synthetic_path(), t);

        // BTreeMap for a deterministic group order.
        let mut groups: BTreeMap<PathBuf, Vec<TextEdit>> = BTreeMap::new();
        for location in locations {
            let Some(span) = self
                .engine()
                .to_original(&location.file, location.start, location.end)
            else {
                continue;
            };
            // Synthetic-only references have no user-visible text to edit.
            if span.start == span.end && location.end > location.start {
                continue;
            }
            let Some((text, _)) = self.store().fresh_contribution(&span.path) else {
                continue;
            };
            let Some(start) = offset_to_position(&text, span.start) else {
                continue;
            };
            let Some(end) = offset_to_position(&text, span.end) else {
                continue;
            };
            groups.entry(span.path).or_default().push(TextEdit {
                range: Range { start, end },
                new_text: new_name.to_string(),
            });
        }
        if groups.is_empty() {
            return None;
        }

        let mut document_changes = Vec::new();
        for (path, edits) in groups {
            let uri = path_to_uri(&path).ok()?;
            // Stamp the file's version as of now, not of any earlier cache.
            let version = self.store().version_of(&path)?;
            document_changes.push(TextDocumentEdit {
                text_document: OptionalVersionedTextDocumentIdentifier {
                    uri,
                    version: Some(version.min(i32::MAX as u64) as i32),
                },
                edits: edits.into_iter().map(OneOf::Left).collect(),
            });
        }

        Some(WorkspaceEdit {
            document_changes: Some(DocumentChanges::Edits(document_changes)),
            ..Default::default()
        })
    }
}
