//! Quick fixes.
//!
//! Requested diagnostics are filtered to the ones this system produced (by
//! source tag) with a numeric code; the Analyzer is queried over the
//! translated synthetic range; every returned edit is translated back and
//! grouped by the original file owning its span, which retargets
//! script-flavored edits of a markup-originated request to the companion
//! script file automatically.
//!
//! Suppression fixes never apply the Analyzer's native comment syntax to
//! markup: the markup-native suppression comment is inserted on its own
//! line above the target, reusing the leading whitespace run of the
//! original line at the insertion point.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tower_lsp_server::ls_types::{
    CodeAction, CodeActionKind, Diagnostic, NumberOrString, Range, TextEdit, Uri, WorkspaceEdit,
};

use crate::analyzer::CodeFixAction;
use crate::module::FileKind;
use crate::text::offset_to_position;
use crate::uri::path_to_uri;

use super::LanguageService;
use super::diagnostics::DIAGNOSTIC_SOURCE;

impl LanguageService {
    pub fn quick_fixes(
        &self,
        uri: &Uri,
        range: Range,
        diagnostics: &[Diagnostic],
    ) -> Vec<CodeAction> {
        let Some(target) = self.resolve(uri) else {
            return Vec::new();
        };

        let codes = own_error_codes(diagnostics);
        if codes.is_empty() {
            return Vec::new();
        }

        let table = target.cached.table();
        let Some(start) = target.offset_at(range.start) else {
            return Vec::new();
        };
        let Some(t_start) = table.to_synthetic(&target.path, start) else {
            return Vec::new();
        };
        let t_end = target
            .offset_at(range.end)
            .and_then(|end| table.to_synthetic(&target.path, end))
            .unwrap_or(t_start)
            .max(t_start);

        let fixes =
            self.analyzer()
                .code_fixes_at(target.synthetic_path(), t_start, t_end, &codes);
        fixes
            .into_iter()
            .filter_map(|fix| self.to_code_action(fix))
            .collect()
    }

    fn to_code_action(&self, fix: CodeFixAction) -> Option<CodeAction> {
        let suppression = fix.is_suppression();
        let mut groups: BTreeMap<PathBuf, Vec<TextEdit>> = BTreeMap::new();

        for file_changes in &fix.changes {
            for change in &file_changes.changes {
                let span =
                    self.engine()
                        .to_original(&file_changes.file, change.start, change.end)?;
                // Rewriting is decided per edit by where it lands, never by
                // where the request came from: a suppression edit landing in
                // the script half keeps the engine's native comment syntax.
                let markup_destination = FileKind::of(&span.path, &self.settings())
                    == FileKind::Markup
                    || !span.kind.offers_completions();
                let edit = if suppression && markup_destination {
                    self.markup_suppression_edit(&span.path, span.start, fix.code)?
                } else {
                    let (text, _) = self.store().fresh_contribution(&span.path)?;
                    TextEdit {
                        range: Range {
                            start: offset_to_position(&text, span.start)?,
                            end: offset_to_position(&text, span.end)?,
                        },
                        new_text: change.new_text.clone(),
                    }
                };
                groups.entry(span.path).or_default().push(edit);
            }
        }
        if groups.is_empty() {
            return None;
        }

        let mut changes = std::collections::HashMap::new();
        for (path, edits) in groups {
            changes.insert(path_to_uri(&path).ok()?, edits);
        }
        Some(CodeAction {
            title: fix.description,
            kind: Some(CodeActionKind::QUICKFIX),
            edit: Some(WorkspaceEdit {
                changes: Some(changes),
                ..Default::default()
            }),
            ..Default::default()
        })
    }

    /// Insert the markup-native suppression comment on its own line above
    /// `offset`, copying the leading whitespace run of that line.
    fn markup_suppression_edit(
        &self,
        path: &Path,
        offset: usize,
        code: Option<u32>,
    ) -> Option<TextEdit> {
        let (text, _) = self.store().fresh_contribution(path)?;
        let line_start = text[..offset.min(text.len())]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let indent: String = text[line_start..]
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .collect();
        let comment = self.engine().synthesizer().markup_suppression_comment(code);

        let position = offset_to_position(&text, line_start)?;
        Some(TextEdit {
            range: Range {
                start: position,
                end: position,
            },
            new_text: format!("{indent}{comment}\n"),
        })
    }
}

/// Error codes of the diagnostics this system produced; anything without
/// our source tag or without a numeric code is not actionable here.
fn own_error_codes(diagnostics: &[Diagnostic]) -> Vec<u32> {
    let mut codes: Vec<u32> = diagnostics
        .iter()
        .filter(|diag| diag.source.as_deref() == Some(DIAGNOSTIC_SOURCE))
        .filter_map(|diag| match &diag.code {
            Some(NumberOrString::Number(code)) if *code >= 0 => Some(*code as u32),
            _ => None,
        })
        .collect();
    codes.sort_unstable();
    codes.dedup();
    codes
}
