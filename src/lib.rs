pub mod analyzer;
pub mod config;
pub mod document;
pub mod error;
pub mod lsp;
pub mod mapping;
pub mod module;
pub mod service;
pub mod synthesis;
pub mod text;
pub mod uri;

pub use analyzer::{Analyzer, AnalyzerHost, WorkspaceHost};
pub use config::Settings;
pub use error::{CoreError, CoreResult};
pub use lsp::{StitchLs, serve};
pub use mapping::{MappingTable, SegmentKind};
pub use module::{FileKind, LogicalModule};
pub use service::LanguageService;
pub use synthesis::{SynthesisEngine, SynthesisOutput, Synthesizer};
