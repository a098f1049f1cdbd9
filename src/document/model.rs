use std::path::{Path, PathBuf};

use crate::module::FileKind;

/// One original file as the editor sees it: current text, a strictly
/// increasing version, and the flags driving cache invalidation.
#[derive(Clone, Debug)]
pub struct OriginalFile {
    path: PathBuf,
    text: String,
    version: u64,
    kind: FileKind,
    /// Set by `mark_stale` when the file changed on disk outside editor
    /// control; cleared on the next synthesis read.
    stale: bool,
    /// Open in the editor. Open files are part of the Analyzer's file set
    /// and their text is never reloaded from disk.
    open_in_editor: bool,
}

impl OriginalFile {
    pub(crate) fn new(
        path: PathBuf,
        text: String,
        version: u64,
        kind: FileKind,
        open_in_editor: bool,
    ) -> Self {
        Self {
            path,
            text,
            version,
            kind,
            stale: false,
            open_in_editor,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn is_open_in_editor(&self) -> bool {
        self.open_in_editor
    }

    /// Replace the text under a fresh version. Marks the file open when the
    /// change came from the editor.
    pub(crate) fn set_text(&mut self, text: String, version: u64, from_editor: bool) {
        debug_assert!(version > self.version, "versions must strictly increase");
        self.text = text;
        self.version = version;
        self.stale = false;
        if from_editor {
            self.open_in_editor = true;
        }
    }

    pub(crate) fn mark_stale(&mut self) {
        self.stale = true;
    }
}
