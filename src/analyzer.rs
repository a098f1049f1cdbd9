//! The external program-analysis engine, as an opaque capability.
//!
//! Any engine that answers the query surface below by synthetic path and
//! byte offset can sit behind [`Analyzer`]; the core never depends on a
//! concrete implementation. The flip side is [`AnalyzerHost`]: the snapshot
//! surface the core provides to the engine, which serves synthetic text for
//! every file that belongs to a logical module — never raw original text.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::document::DocumentStore;
use crate::synthesis::SynthesisEngine;

/// Severity bucket of an analyzer diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Suggestion,
    Message,
}

/// A diagnostic reported against a synthetic file, by byte offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzerDiagnostic {
    /// Synthetic file the engine computed this against.
    pub file: PathBuf,
    pub start: usize,
    pub length: usize,
    pub message: String,
    pub code: Option<u32>,
    pub category: DiagnosticCategory,
}

/// A span in a (synthetic) file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpanInFile {
    pub file: PathBuf,
    pub start: usize,
    pub end: usize,
}

/// One completion entry, with enough context to resolve details lazily.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionEntry {
    pub name: String,
    pub kind: String,
    pub sort_text: Option<String>,
    pub insert_text: Option<String>,
    /// Engine-specific origin tag, echoed back on detail resolution.
    pub source: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionDetails {
    pub name: String,
    pub display: String,
    pub documentation: Option<String>,
}

/// Quick-info (hover) answer: the queried symbol's span plus display text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickInfo {
    pub start: usize,
    pub end: usize,
    pub display: String,
    pub documentation: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameInfo {
    pub can_rename: bool,
    pub display_name: String,
    pub trigger_start: usize,
    pub trigger_end: usize,
}

/// A single text replacement inside one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextChange {
    pub start: usize,
    pub end: usize,
    pub new_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileTextChanges {
    pub file: PathBuf,
    pub changes: Vec<TextChange>,
}

/// Fix id an engine uses for its "insert a suppression comment above the
/// offending line" fix. The orchestrator rewrites this one into
/// markup-native syntax when the edit lands in a markup file.
pub const SUPPRESS_DIAGNOSTIC_FIX: &str = "disable-next-line";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeFixAction {
    /// Engine-specific fix identifier, e.g. [`SUPPRESS_DIAGNOSTIC_FIX`].
    pub fix_id: String,
    pub description: String,
    /// Error code of the diagnostic this fix addresses, when the engine
    /// reports one.
    pub code: Option<u32>,
    pub changes: Vec<FileTextChanges>,
}

impl CodeFixAction {
    pub fn is_suppression(&self) -> bool {
        self.fix_id == SUPPRESS_DIAGNOSTIC_FIX
    }
}

/// Query surface of the external analysis engine. All positions are byte
/// offsets into the synthetic text served by [`AnalyzerHost`].
pub trait Analyzer: Send + Sync {
    fn syntactic_diagnostics(&self, file: &Path) -> Vec<AnalyzerDiagnostic>;
    fn semantic_diagnostics(&self, file: &Path) -> Vec<AnalyzerDiagnostic>;
    fn suggestion_diagnostics(&self, file: &Path) -> Vec<AnalyzerDiagnostic>;

    fn completions_at(&self, file: &Path, offset: usize) -> Option<Vec<CompletionEntry>>;
    fn completion_details(
        &self,
        file: &Path,
        offset: usize,
        name: &str,
        source: Option<&str>,
    ) -> Option<CompletionDetails>;

    fn quick_info_at(&self, file: &Path, offset: usize) -> Option<QuickInfo>;
    fn definition_at(&self, file: &Path, offset: usize) -> Vec<SpanInFile>;
    fn references_at(&self, file: &Path, offset: usize) -> Vec<SpanInFile>;

    fn rename_info_at(&self, file: &Path, offset: usize) -> Option<RenameInfo>;
    fn rename_locations_at(&self, file: &Path, offset: usize) -> Vec<SpanInFile>;

    fn code_fixes_at(
        &self,
        file: &Path,
        start: usize,
        end: usize,
        error_codes: &[u32],
    ) -> Vec<CodeFixAction>;
}

/// The snapshot surface the core provides to the engine.
pub trait AnalyzerHost: Send + Sync {
    /// Synthetic paths of every analyzable module currently in the file set.
    fn script_file_names(&self) -> Vec<PathBuf>;
    /// Change-detection key for one synthetic file.
    fn script_version(&self, file: &Path) -> Option<String>;
    /// Current text of one synthetic file.
    fn script_snapshot(&self, file: &Path) -> Option<Arc<str>>;
    fn file_exists(&self, file: &Path) -> bool;
    fn read_file(&self, file: &Path) -> Option<String>;
}

/// [`AnalyzerHost`] over the document store and synthesis engine.
pub struct WorkspaceHost {
    store: Arc<DocumentStore>,
    engine: Arc<SynthesisEngine>,
}

impl WorkspaceHost {
    pub fn new(store: Arc<DocumentStore>, engine: Arc<SynthesisEngine>) -> Self {
        Self { store, engine }
    }
}

impl AnalyzerHost for WorkspaceHost {
    fn script_file_names(&self) -> Vec<PathBuf> {
        self.store.open_synthetic_paths()
    }

    fn script_version(&self, file: &Path) -> Option<String> {
        let cached = self.engine.module_by_synthetic_path(file)?;
        // Contributing versions joined in contributor order; any bump in any
        // half changes the key.
        Some(
            cached
                .dependencies()
                .iter()
                .map(|(_, version)| version.to_string())
                .collect::<Vec<_>>()
                .join(":"),
        )
    }

    fn script_snapshot(&self, file: &Path) -> Option<Arc<str>> {
        self.engine
            .module_by_synthetic_path(file)
            .map(|cached| cached.text())
    }

    fn file_exists(&self, file: &Path) -> bool {
        if self.engine.module_by_synthetic_path(file).is_some() {
            return true;
        }
        if self.store.module_for(file).is_some() {
            return self.engine.module_for_original(file).is_some();
        }
        self.store.contains(file) || file.is_file()
    }

    fn read_file(&self, file: &Path) -> Option<String> {
        if let Some(cached) = self.engine.module_by_synthetic_path(file) {
            return Some(cached.text().to_string());
        }
        // A contributing original is never served raw; the module's
        // synthetic text is the only view the engine gets of it.
        if self.store.module_for(file).is_some() {
            return self
                .engine
                .module_for_original(file)
                .map(|cached| cached.text().to_string());
        }
        if let Some(text) = self.store.text_of(file) {
            return Some(text);
        }
        std::fs::read_to_string(file).ok()
    }
}
