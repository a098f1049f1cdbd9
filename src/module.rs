//! Logical module identity.
//!
//! A logical module is the unit the Analyzer sees as one file: a script
//! file, a markup file, or a script + markup pair sharing one stem. The
//! synthetic file name is derived deterministically from the contributing
//! path(s), so both halves of a pair resolve to the same module and a
//! reopened file lands on the same registration.

use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Distinctive infix for synthetic file names, preventing collisions with
/// real files (`a.ts` + `a.tpl` -> `a.stitched.ts`).
pub const SYNTHETIC_INFIX: &str = "stitched";

/// Classification of an original file by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// Typed script (.ts/.tsx)
    TypedScript,
    /// Loosely-typed script (.js/.jsx), analyzable only when configured
    LooseScript,
    /// Companion markup/template file
    Markup,
    /// Anything else; never part of a logical module
    Other,
}

impl FileKind {
    pub fn of(path: &Path, settings: &Settings) -> FileKind {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return FileKind::Other;
        };
        match ext {
            "ts" | "tsx" => FileKind::TypedScript,
            "js" | "jsx" => FileKind::LooseScript,
            _ if ext == settings.markup_extension => FileKind::Markup,
            _ => FileKind::Other,
        }
    }

    pub fn is_script(self) -> bool {
        matches!(self, FileKind::TypedScript | FileKind::LooseScript)
    }
}

/// The unit analyzed as one file by the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogicalModule {
    /// Derived name of the synthetic file presented to the Analyzer.
    pub synthetic_path: PathBuf,
    /// Script half, when present.
    pub script: Option<PathBuf>,
    /// Markup half, when present.
    pub markup: Option<PathBuf>,
}

impl LogicalModule {
    /// Build the module identity from its contributing paths. At least one
    /// half must be present.
    pub fn from_parts(script: Option<PathBuf>, markup: Option<PathBuf>) -> Option<LogicalModule> {
        let representative = script.as_deref().or(markup.as_deref())?;
        let synthetic_path = synthetic_path_for(script.as_deref(), representative);
        Some(LogicalModule {
            synthetic_path,
            script,
            markup,
        })
    }

    pub fn contributors(&self) -> impl Iterator<Item = &Path> {
        self.script
            .as_deref()
            .into_iter()
            .chain(self.markup.as_deref())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.contributors().any(|p| p == path)
    }

    /// Whether the Analyzer may see this module. The synthetic file keeps the
    /// script contributor's extension, so ts-flavored modules are always
    /// analyzable and js-flavored ones only when loose script is allowed.
    pub fn is_analyzable(&self, settings: &Settings) -> bool {
        match self
            .synthetic_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
        {
            "ts" | "tsx" => true,
            "js" | "jsx" => settings.allow_loose_script,
            _ => false,
        }
    }
}

/// Derive the synthetic file path for a module.
///
/// Markup-only modules synthesize as typed script.
fn synthetic_path_for(script: Option<&Path>, representative: &Path) -> PathBuf {
    let ext = script
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .unwrap_or("ts");
    let stem = representative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("module");
    representative.with_file_name(format!("{stem}.{SYNTHETIC_INFIX}.{ext}"))
}

/// Path of the companion file that would pair with `path`, purely by name.
/// Existence is the Document Store's concern.
pub fn companion_candidate(path: &Path, settings: &Settings) -> Option<PathBuf> {
    match FileKind::of(path, settings) {
        FileKind::TypedScript | FileKind::LooseScript => {
            let stem = path.file_stem()?.to_str()?;
            Some(path.with_file_name(format!("{stem}.{}", settings.markup_extension)))
        }
        // A markup file pairs with the first script flavor that exists; the
        // store probes these candidates in order.
        FileKind::Markup => None,
        FileKind::Other => None,
    }
}

/// Ordered companion candidates for a markup file.
pub fn script_candidates(path: &Path, settings: &Settings) -> Vec<PathBuf> {
    if FileKind::of(path, settings) != FileKind::Markup {
        return Vec::new();
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return Vec::new();
    };
    ["ts", "tsx", "js", "jsx"]
        .iter()
        .map(|ext| path.with_file_name(format!("{stem}.{ext}")))
        .collect()
}
