//! Completions.
//!
//! Free markup text offers no completions: a position whose owning segment
//! is `TextContent` or `TemplateEmbedding`, or that maps to no segment at
//! all, answers `None` (never an empty list, so clients can distinguish
//! "nothing here by design" from "no matches").

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tower_lsp_server::ls_types::{
    CompletionItem, CompletionItemKind, Documentation, Position, Uri,
};

use crate::analyzer::CompletionEntry;

use super::LanguageService;

/// Marker stored in `CompletionItem::data` so detail resolution can find
/// its way back to the synthetic offset.
pub const COMPLETION_DATA_KIND: &str = "stitch-completion";

/// Context a completion item carries for lazy detail resolution.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionData {
    kind: String,
    synthetic_path: PathBuf,
    offset: usize,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
}

impl LanguageService {
    pub fn completions(&self, uri: &Uri, position: Position) -> Option<Vec<CompletionItem>> {
        let target = self.resolve(uri)?;
        let offset = target.offset_at(position)?;

        let table = target.cached.table();
        let t = table.to_synthetic(&target.path, offset)?;
        let segment = table.segment_at_synthetic(t)?;
        if !segment.kind.offers_completions() {
            return None;
        }

        let entries = self
            .analyzer()
            .completions_at(target.synthetic_path(), t)?;
        let synthetic_path = target.synthetic_path().to_path_buf();
        Some(
            entries
                .into_iter()
                .map(|entry| to_completion_item(entry, &synthetic_path, t))
                .collect(),
        )
    }

    /// Resolve the details of a previously returned completion item.
    pub fn resolve_completion(&self, mut item: CompletionItem) -> CompletionItem {
        let Some(data) = item.data.take().and_then(parse_data) else {
            return item;
        };
        if let Some(details) = self.analyzer().completion_details(
            &data.synthetic_path,
            data.offset,
            &data.name,
            data.source.as_deref(),
        ) {
            item.detail = Some(details.display);
            item.documentation = details.documentation.map(Documentation::String);
        }
        item
    }
}

fn parse_data(value: Value) -> Option<CompletionData> {
    let data: CompletionData = serde_json::from_value(value).ok()?;
    (data.kind == COMPLETION_DATA_KIND).then_some(data)
}

fn to_completion_item(entry: CompletionEntry, synthetic_path: &PathBuf, offset: usize) -> CompletionItem {
    let data = CompletionData {
        kind: COMPLETION_DATA_KIND.to_string(),
        synthetic_path: synthetic_path.clone(),
        offset,
        name: entry.name.clone(),
        source: entry.source.clone(),
    };
    CompletionItem {
        label: entry.name,
        kind: Some(item_kind(&entry.kind)),
        sort_text: entry.sort_text,
        insert_text: entry.insert_text,
        data: serde_json::to_value(data).ok(),
        ..Default::default()
    }
}

fn item_kind(kind: &str) -> CompletionItemKind {
    match kind {
        "class" => CompletionItemKind::CLASS,
        "interface" => CompletionItemKind::INTERFACE,
        "enum" => CompletionItemKind::ENUM,
        "module" => CompletionItemKind::MODULE,
        "function" => CompletionItemKind::FUNCTION,
        "method" => CompletionItemKind::METHOD,
        "property" | "getter" | "setter" => CompletionItemKind::PROPERTY,
        "keyword" => CompletionItemKind::KEYWORD,
        "const" | "let" | "var" | "local var" => CompletionItemKind::VARIABLE,
        "parameter" => CompletionItemKind::VARIABLE,
        _ => CompletionItemKind::TEXT,
    }
}
