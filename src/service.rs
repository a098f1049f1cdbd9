//! The analysis orchestrator.
//!
//! Every public operation follows the same shape: resolve the logical module
//! for the requested document, translate the position into the synthetic
//! text, invoke the Analyzer, translate every returned span back into
//! original coordinates, then apply the operation's filtering rules. Each
//! operation lives in its own file under `service/`.
//!
//! All operations degrade to an empty or `None` result instead of erroring:
//! unsupported file kinds, positions outside any mapping segment, and
//! synthetic-only artifacts are expected, not failures.

mod completions;
mod diagnostics;
mod hover;
mod navigation;
mod quick_fixes;
mod rename;

pub use completions::COMPLETION_DATA_KIND;
pub use diagnostics::DIAGNOSTIC_SOURCE;
pub use hover::HoverInfo;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tower_lsp_server::ls_types::{Location, Position, Uri};

use crate::analyzer::Analyzer;
use crate::config::Settings;
use crate::document::DocumentStore;
use crate::synthesis::{CachedModule, SynthesisEngine, Synthesizer};
use crate::text::{offset_to_position, position_to_offset};
use crate::uri::{path_to_uri, uri_to_path};

pub struct LanguageService {
    settings: Arc<ArcSwap<Settings>>,
    store: Arc<DocumentStore>,
    engine: Arc<SynthesisEngine>,
    analyzer: Arc<dyn Analyzer>,
}

/// Per-request resolution of a document URI. Synthesis runs once here and
/// the result is reused for the rest of the request.
pub(crate) struct RequestTarget {
    pub(crate) path: PathBuf,
    /// The original file's current text, for position translation.
    pub(crate) text: String,
    pub(crate) cached: Arc<CachedModule>,
}

impl RequestTarget {
    pub(crate) fn synthetic_path(&self) -> &Path {
        &self.cached.module().synthetic_path
    }

    pub(crate) fn offset_at(&self, position: Position) -> Option<usize> {
        position_to_offset(&self.text, position)
    }
}

impl LanguageService {
    pub fn new(analyzer: Arc<dyn Analyzer>, synthesizer: Arc<dyn Synthesizer>) -> Self {
        let settings = Arc::new(ArcSwap::from_pointee(Settings::default()));
        let store = Arc::new(DocumentStore::new(Arc::clone(&settings)));
        let engine = Arc::new(SynthesisEngine::new(Arc::clone(&store), synthesizer));
        Self {
            settings,
            store,
            engine,
            analyzer,
        }
    }

    pub fn apply_settings(&self, settings: Settings) {
        self.settings.store(Arc::new(settings));
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn engine(&self) -> &Arc<SynthesisEngine> {
        &self.engine
    }

    pub(crate) fn analyzer(&self) -> &dyn Analyzer {
        self.analyzer.as_ref()
    }

    // ------------------------------------------------------------------
    // Document lifecycle
    // ------------------------------------------------------------------

    pub fn open_document(&self, uri: &Uri, text: String) -> Option<PathBuf> {
        let path = uri_to_path(uri).ok()?;
        self.store.open(path.clone(), text);
        Some(path)
    }

    pub fn update_document(&self, uri: &Uri, text: String) {
        if let Ok(path) = uri_to_path(uri) {
            self.store.update(path, text);
        }
    }

    pub fn close_document(&self, uri: &Uri) {
        let Ok(path) = uri_to_path(uri) else {
            return;
        };
        self.store.close(&path);
        // The module survives while its companion still maps to the same
        // synthetic path; dropping the cache entry is enough, the next read
        // resynthesizes from whatever halves remain.
        self.engine.invalidate(&path);
    }

    /// A file changed on disk outside editor control.
    pub fn mark_document_stale(&self, uri: &Uri) {
        if let Ok(path) = uri_to_path(uri) {
            self.store.mark_stale(&path);
        }
    }

    /// A file disappeared from disk.
    pub fn remove_document(&self, uri: &Uri) {
        self.close_document(uri);
    }

    /// Debugging side channel: the synthetic text and its URI for a given
    /// original document.
    pub fn synthetic_text_for(&self, uri: &Uri) -> Option<(Uri, String)> {
        let target = self.resolve(uri)?;
        let synthetic_uri = path_to_uri(target.synthetic_path()).ok()?;
        Some((synthetic_uri, target.cached.text().to_string()))
    }

    // ------------------------------------------------------------------
    // Shared request plumbing
    // ------------------------------------------------------------------

    /// Resolve a request URI to its analyzable module, or `None` when the
    /// operation should degrade to its empty result.
    pub(crate) fn resolve(&self, uri: &Uri) -> Option<RequestTarget> {
        let path = uri_to_path(uri).ok()?;
        let cached = self.engine.module_for_original(&path)?;
        let (text, _) = self.store.fresh_contribution(&path)?;
        Some(RequestTarget { path, text, cached })
    }

    /// Protocol location for an original-file span, using that file's own
    /// current text for position translation.
    pub(crate) fn location_for(&self, path: &Path, start: usize, end: usize) -> Option<Location> {
        let (text, _) = self.store.fresh_contribution(path)?;
        let range_start = offset_to_position(&text, start)?;
        let range_end = offset_to_position(&text, end)?;
        Some(Location {
            uri: path_to_uri(path).ok()?,
            range: tower_lsp_server::ls_types::Range {
                start: range_start,
                end: range_end,
            },
        })
    }
}
