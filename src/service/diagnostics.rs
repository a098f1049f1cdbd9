//! Diagnostics: collect from the Analyzer against the synthetic file,
//! rewrite to original coordinates, and keep only what belongs to the
//! requested file. Diagnostics that translate into the companion file are
//! not merged in; the companion surfaces them in its own response.

use tower_lsp_server::ls_types::{
    Diagnostic, DiagnosticSeverity, NumberOrString, Range, Uri,
};

use crate::analyzer::DiagnosticCategory;
use crate::synthesis::RewrittenDiagnostic;
use crate::text::offset_to_position;

use super::LanguageService;

/// `source` stamped on every diagnostic this system produces, and the key
/// quick-fix requests use to recognize them.
pub const DIAGNOSTIC_SOURCE: &str = "stitch";

impl LanguageService {
    pub fn diagnostics(&self, uri: &Uri) -> Vec<Diagnostic> {
        let Some(target) = self.resolve(uri) else {
            return Vec::new();
        };
        let synthetic = target.synthetic_path();

        let mut collected = self.analyzer().syntactic_diagnostics(synthetic);
        collected.extend_from_slice(target.cached.transform_diagnostics());
        collected.extend(self.analyzer().semantic_diagnostics(synthetic));
        collected.extend(self.analyzer().suggestion_diagnostics(synthetic));

        self.engine()
            .rewrite_diagnostics(collected, &target.path)
            .into_iter()
            .filter(|diag| diag.path == target.path)
            .filter_map(|diag| to_protocol_diagnostic(&target.text, diag))
            .collect()
    }
}

fn to_protocol_diagnostic(text: &str, diag: RewrittenDiagnostic) -> Option<Diagnostic> {
    let start = offset_to_position(text, diag.start)?;
    let end = offset_to_position(text, diag.end)?;
    Some(Diagnostic {
        range: Range { start, end },
        severity: Some(severity_of(diag.category)),
        code: diag.code.map(|c| NumberOrString::Number(c as i32)),
        source: Some(DIAGNOSTIC_SOURCE.to_string()),
        message: diag.message,
        ..Default::default()
    })
}

fn severity_of(category: DiagnosticCategory) -> DiagnosticSeverity {
    match category {
        DiagnosticCategory::Error => DiagnosticSeverity::ERROR,
        DiagnosticCategory::Warning => DiagnosticSeverity::WARNING,
        DiagnosticCategory::Suggestion => DiagnosticSeverity::HINT,
        DiagnosticCategory::Message => DiagnosticSeverity::INFORMATION,
    }
}
