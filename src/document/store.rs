use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use dashmap::mapref::one::Ref;
use std::ops::Deref;

use crate::config::Settings;
use crate::document::OriginalFile;
use crate::module::{FileKind, LogicalModule, companion_candidate, script_candidates};

/// The central store for original files and their pairing into logical
/// modules.
///
/// Versions come from one store-wide counter, so they are strictly
/// increasing per file and never reused even across close/reopen.
pub struct DocumentStore {
    files: DashMap<PathBuf, OriginalFile>,
    next_version: AtomicU64,
    settings: Arc<ArcSwap<Settings>>,
}

/// Read handle borrowing one file from the store.
pub struct FileHandle<'a> {
    inner: Ref<'a, PathBuf, OriginalFile>,
}

impl<'a> Deref for FileHandle<'a> {
    type Target = OriginalFile;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DocumentStore {
    pub fn new(settings: Arc<ArcSwap<Settings>>) -> Self {
        Self {
            files: DashMap::new(),
            next_version: AtomicU64::new(0),
            settings,
        }
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    fn bump_version(&self) -> u64 {
        self.next_version.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Open a file from the editor. The file joins the Analyzer's file set.
    pub fn open(&self, path: PathBuf, text: String) {
        self.set_text(path, text, true);
    }

    /// Apply a full-text edit from the editor.
    pub fn update(&self, path: PathBuf, text: String) {
        self.set_text(path, text, true);
    }

    fn set_text(&self, path: PathBuf, text: String, from_editor: bool) {
        let version = self.bump_version();
        match self.files.get_mut(&path) {
            Some(mut file) => file.set_text(text, version, from_editor),
            None => {
                let kind = FileKind::of(&path, &self.settings());
                self.files.insert(
                    path.clone(),
                    OriginalFile::new(path, text, version, kind, from_editor),
                );
            }
        }
    }

    /// Close a file in the editor. The entry is destroyed; companion-backed
    /// modules reload it from disk on the next synthesis read.
    pub fn close(&self, path: &Path) -> Option<OriginalFile> {
        self.files.remove(path).map(|(_, file)| file)
    }

    /// Flag a file's cached synthesis as invalid after an out-of-editor
    /// change. No regeneration happens until the next read.
    pub fn mark_stale(&self, path: &Path) {
        if let Some(mut file) = self.files.get_mut(path) {
            file.mark_stale();
        }
    }

    pub fn get(&self, path: &Path) -> Option<FileHandle<'_>> {
        self.files.get(path).map(|inner| FileHandle { inner })
    }

    pub fn text_of(&self, path: &Path) -> Option<String> {
        self.files.get(path).map(|file| file.text().to_string())
    }

    pub fn version_of(&self, path: &Path) -> Option<u64> {
        self.files.get(path).map(|file| file.version())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    /// The paired file for `path`'s logical module, when one exists in the
    /// store or on disk. Removing one half must not remove the module while
    /// this returns `Some`.
    pub fn companion_of(&self, path: &Path) -> Option<PathBuf> {
        let settings = self.settings();
        match FileKind::of(path, &settings) {
            kind if kind.is_script() => {
                let candidate = companion_candidate(path, &settings)?;
                self.known_or_on_disk(candidate)
            }
            FileKind::Markup => script_candidates(path, &settings)
                .into_iter()
                .find_map(|candidate| self.known_or_on_disk(candidate)),
            _ => None,
        }
    }

    fn known_or_on_disk(&self, candidate: PathBuf) -> Option<PathBuf> {
        (self.files.contains_key(&candidate) || candidate.is_file()).then_some(candidate)
    }

    /// Resolve the logical module `path` contributes to.
    pub fn module_for(&self, path: &Path) -> Option<LogicalModule> {
        let settings = self.settings();
        match FileKind::of(path, &settings) {
            kind if kind.is_script() => {
                LogicalModule::from_parts(Some(path.to_path_buf()), self.companion_of(path))
            }
            FileKind::Markup => {
                LogicalModule::from_parts(self.companion_of(path), Some(path.to_path_buf()))
            }
            _ => None,
        }
    }

    /// Current text and version of a contributor, loading from disk when the
    /// file is not in the store and reloading when it was marked stale while
    /// not open in the editor (the editor buffer always wins over the disk).
    pub fn fresh_contribution(&self, path: &Path) -> Option<(String, u64)> {
        if let Some(file) = self.files.get(path) {
            if !file.is_stale() {
                return Some((file.text().to_string(), file.version()));
            }
            if file.is_open_in_editor() {
                // Watched-file change raced an editor buffer; the buffer is
                // authoritative, just clear the flag under a fresh version.
                drop(file);
                let version = self.bump_version();
                let mut file = self.files.get_mut(path)?;
                let text = file.text().to_string();
                file.set_text(text.clone(), version, true);
                return Some((text, version));
            }
            drop(file);
        } else if !path.is_file() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(text) => {
                self.set_text(path.to_path_buf(), text.clone(), false);
                let version = self.version_of(path)?;
                Some((text, version))
            }
            Err(err) => {
                log::warn!("failed to read {}: {err}", path.display());
                self.files.remove(path);
                None
            }
        }
    }

    /// Synthetic paths of every analyzable module with at least one file
    /// open in the editor. This is the Analyzer's file set.
    pub fn open_synthetic_paths(&self) -> Vec<PathBuf> {
        let settings = self.settings();
        let mut paths: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|entry| entry.value().is_open_in_editor())
            .filter_map(|entry| self.module_for(entry.key()))
            .filter(|module| module.is_analyzable(&settings))
            .map(|module| module.synthetic_path)
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}
