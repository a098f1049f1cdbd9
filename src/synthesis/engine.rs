//! The synthesis engine: produces and caches synthetic text per logical
//! module, and answers offset translation in both directions.
//!
//! The cache is an explicit object keyed by synthetic path, with the
//! contributing `(path, version)` list as the validity key. A version bump
//! or stale flag invalidates an entry but nothing is regenerated until the
//! next read, so rapid successive edits cost one synthesis, not one per
//! keystroke.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;

use crate::analyzer::{AnalyzerDiagnostic, DiagnosticCategory};
use crate::document::DocumentStore;
use crate::mapping::{MappingSegment, MappingTable, OriginalSpan};
use crate::module::{LogicalModule, SYNTHETIC_INFIX, script_candidates};

/// Current text of one contributing file, as fed to a synthesizer.
#[derive(Clone, Debug)]
pub struct SourceContribution {
    pub path: PathBuf,
    pub text: String,
    pub version: u64,
}

/// Everything a synthesizer sees for one module.
#[derive(Clone, Debug)]
pub struct ModuleSources {
    pub module: LogicalModule,
    pub script: Option<SourceContribution>,
    pub markup: Option<SourceContribution>,
}

/// A synthesizer's answer: the synthetic text, its segment list, and any
/// transform-specific diagnostics (in synthetic coordinates; the engine
/// stamps the synthetic file name on them).
#[derive(Clone, Debug)]
pub struct SynthesisOutput {
    pub text: String,
    pub segments: Vec<MappingSegment>,
    pub diagnostics: Vec<AnalyzerDiagnostic>,
}

/// A concrete markup grammar's generator. Implementations own all grammar
/// knowledge; the core only caches and queries what they produce.
pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, sources: &ModuleSources) -> SynthesisOutput;

    /// The markup-native suppression comment for a diagnostic code, without
    /// indentation or trailing newline.
    fn markup_suppression_comment(&self, code: Option<u32>) -> String;
}

/// One synthesized module, immutable once cached.
pub struct CachedModule {
    module: LogicalModule,
    text: Arc<str>,
    table: Arc<MappingTable>,
    diagnostics: Vec<AnalyzerDiagnostic>,
    deps: Vec<(PathBuf, u64)>,
}

impl CachedModule {
    pub fn module(&self) -> &LogicalModule {
        &self.module
    }

    pub fn text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    pub fn table(&self) -> &MappingTable {
        &self.table
    }

    /// Transform-specific diagnostics captured at synthesis time.
    pub fn transform_diagnostics(&self) -> &[AnalyzerDiagnostic] {
        &self.diagnostics
    }

    /// Contributing `(path, version)` pairs, script half first.
    pub fn dependencies(&self) -> &[(PathBuf, u64)] {
        &self.deps
    }
}

/// A diagnostic translated back into original-file coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RewrittenDiagnostic {
    pub path: PathBuf,
    pub start: usize,
    pub end: usize,
    pub message: String,
    pub code: Option<u32>,
    pub category: DiagnosticCategory,
}

pub struct SynthesisEngine {
    store: Arc<DocumentStore>,
    synthesizer: Arc<dyn Synthesizer>,
    cache: DashMap<PathBuf, Arc<CachedModule>>,
}

impl SynthesisEngine {
    pub fn new(store: Arc<DocumentStore>, synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self {
            store,
            synthesizer,
            cache: DashMap::new(),
        }
    }

    pub fn synthesizer(&self) -> &dyn Synthesizer {
        self.synthesizer.as_ref()
    }

    /// Fresh synthesized module for an original file, regenerating lazily
    /// when any contributor changed. `None` when the file belongs to no
    /// analyzable module.
    pub fn module_for_original(&self, path: &Path) -> Option<Arc<CachedModule>> {
        let module = self.store.module_for(path)?;
        if !module.is_analyzable(&self.store.settings()) {
            return None;
        }
        self.get_or_synthesize(module)
    }

    /// Fresh synthesized module by its synthetic file name, for Analyzer
    /// host callbacks that only know the synthetic identity.
    pub fn module_by_synthetic_path(&self, path: &Path) -> Option<Arc<CachedModule>> {
        if let Some(entry) = self.cache.get(path) {
            let contributor = entry.module.contributors().next()?.to_path_buf();
            drop(entry);
            return self.module_for_original(&contributor);
        }
        let contributor = self.contributor_from_synthetic_name(path)?;
        let cached = self.module_for_original(&contributor)?;
        (cached.module.synthetic_path == path).then_some(cached)
    }

    /// Drop cache entries that depend on `path`. Used when a contributor is
    /// closed or deleted; survivors resynthesize from the remaining half.
    pub fn invalidate(&self, path: &Path) {
        self.cache
            .retain(|_, cached| !cached.deps.iter().any(|(dep, _)| dep == path));
    }

    /// Translate an original offset into `(synthetic_path, offset)`,
    /// synthesizing first when nothing is cached yet.
    pub fn to_synthetic(&self, path: &Path, offset: usize) -> Option<(PathBuf, usize)> {
        let cached = self.module_for_original(path)?;
        let t = cached.table.to_synthetic(path, offset)?;
        Some((cached.module.synthetic_path.clone(), t))
    }

    /// Translate a synthetic span back into original coordinates.
    pub fn to_original(&self, synthetic_path: &Path, start: usize, end: usize) -> Option<OriginalSpan> {
        let cached = self.module_by_synthetic_path(synthetic_path)?;
        cached.table.to_original(start, end)
    }

    /// Translate analyzer diagnostics for `source_path`'s module back to
    /// original coordinates, dropping cross-module noise and results that
    /// exist only in the synthetic output.
    pub fn rewrite_diagnostics(
        &self,
        diagnostics: Vec<AnalyzerDiagnostic>,
        source_path: &Path,
    ) -> Vec<RewrittenDiagnostic> {
        let Some(cached) = self.module_for_original(source_path) else {
            return Vec::new();
        };
        diagnostics
            .into_iter()
            .filter(|diag| diag.file == cached.module.synthetic_path)
            .filter_map(|diag| {
                let span = cached.table.to_original(diag.start, diag.start + diag.length)?;
                if span.synthetic_only {
                    return None;
                }
                Some(RewrittenDiagnostic {
                    path: span.path,
                    start: span.start,
                    end: span.end,
                    message: diag.message,
                    code: diag.code,
                    category: diag.category,
                })
            })
            .collect()
    }

    fn get_or_synthesize(&self, module: LogicalModule) -> Option<Arc<CachedModule>> {
        if let Some(entry) = self.cache.get(&module.synthetic_path)
            && entry.module == module
            && self.is_fresh(&entry)
        {
            return Some(Arc::clone(&entry));
        }

        let script = module
            .script
            .as_deref()
            .and_then(|p| self.contribution(p));
        let markup = module
            .markup
            .as_deref()
            .and_then(|p| self.contribution(p));
        if script.is_none() && markup.is_none() {
            self.cache.remove(&module.synthetic_path);
            return None;
        }

        let deps = script
            .iter()
            .chain(markup.iter())
            .map(|c| (c.path.clone(), c.version))
            .collect();
        let sources = ModuleSources {
            module: module.clone(),
            script,
            markup,
        };
        let mut output = self.synthesizer.synthesize(&sources);
        let table = match MappingTable::new(output.segments, output.text.len()) {
            Ok(table) => table,
            Err(err) => {
                log::error!(
                    "synthesizer produced an invalid mapping for {}: {err}",
                    module.synthetic_path.display()
                );
                self.cache.remove(&module.synthetic_path);
                return None;
            }
        };
        for diag in &mut output.diagnostics {
            diag.file = module.synthetic_path.clone();
        }

        log::debug!(
            "synthesized {} ({} segments, {} bytes)",
            module.synthetic_path.display(),
            table.segments().len(),
            output.text.len()
        );
        let cached = Arc::new(CachedModule {
            text: Arc::from(output.text),
            table: Arc::new(table),
            diagnostics: output.diagnostics,
            deps,
            module,
        });
        self.cache
            .insert(cached.module.synthetic_path.clone(), Arc::clone(&cached));
        Some(cached)
    }

    fn is_fresh(&self, cached: &CachedModule) -> bool {
        cached.deps.iter().all(|(path, version)| {
            self.store
                .get(path)
                .is_some_and(|file| file.version() == *version && !file.is_stale())
        })
    }

    fn contribution(&self, path: &Path) -> Option<SourceContribution> {
        let (text, version) = self.store.fresh_contribution(path)?;
        Some(SourceContribution {
            path: path.to_path_buf(),
            text,
            version,
        })
    }

    /// Recover a contributing path from a synthetic file name
    /// (`a.stitched.ts` -> the first existing of `a.ts`, `a.tsx`, ...).
    fn contributor_from_synthetic_name(&self, path: &Path) -> Option<PathBuf> {
        let settings = self.store.settings();
        let outer_stem = path.file_stem()?.to_str()?;
        let (stem, infix) = outer_stem.rsplit_once('.')?;
        if infix != SYNTHETIC_INFIX {
            return None;
        }
        let markup = path.with_file_name(format!("{stem}.{}", settings.markup_extension));
        script_candidates(&markup, &settings)
            .into_iter()
            .chain(std::iter::once(markup))
            .find(|candidate| self.store.contains(candidate) || candidate.is_file())
    }
}
