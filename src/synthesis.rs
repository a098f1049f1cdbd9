//! Synthetic-text synthesis and the module cache.

pub mod engine;

pub use engine::{
    CachedModule, ModuleSources, RewrittenDiagnostic, SourceContribution, SynthesisEngine,
    SynthesisOutput, Synthesizer,
};
