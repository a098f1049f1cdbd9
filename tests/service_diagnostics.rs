//! Diagnostics through the orchestrator: collection, rewriting, ownership
//! filtering, and transform diagnostics.


use fixtures::{find, fixture, pos};
use stitch_ls::analyzer::{AnalyzerDiagnostic, DiagnosticCategory};
use stitch_ls::service::DIAGNOSTIC_SOURCE;
use tower_lsp_server::ls_types::{DiagnosticSeverity, NumberOrString};

#[test]
fn diagnostic_in_markup_surfaces_only_in_the_markup_file() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    let markup_uri = f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, synthetic_text) = f.synthetic(&script_uri);
    // The tag name inside the generated `new A();` statement.
    let tag_name = find(&synthetic_text, "new A") + 4;
    f.analyzer.set_semantic(
        &synthetic_path,
        vec![AnalyzerDiagnostic {
            file: synthetic_path.clone(),
            start: tag_name,
            length: 1,
            message: "Cannot find name 'A'.".to_string(),
            code: Some(2304),
            category: DiagnosticCategory::Error,
        }],
    );

    // The span translates into a.tpl, so the script file reports nothing.
    assert!(f.service.diagnostics(&script_uri).is_empty());

    let for_markup = f.service.diagnostics(&markup_uri);
    assert_eq!(for_markup.len(), 1);
    let diag = &for_markup[0];
    assert_eq!(diag.range.start, pos(0, 7));
    assert_eq!(diag.range.end, pos(0, 8));
    assert_eq!(diag.severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diag.code, Some(NumberOrString::Number(2304)));
    assert_eq!(diag.source.as_deref(), Some(DIAGNOSTIC_SOURCE));
    assert_eq!(diag.message, "Cannot find name 'A'.");
}

#[test]
fn diagnostic_in_script_stays_in_the_script_file() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "let x: string = 1;\n");
    let markup_uri = f.open("/ws/a.tpl", "Hi <A/>");

    let (synthetic_path, _) = f.synthetic(&script_uri);
    f.analyzer.set_semantic(
        &synthetic_path,
        vec![AnalyzerDiagnostic {
            file: synthetic_path.clone(),
            start: 4,
            length: 1,
            message: "Type 'number' is not assignable to type 'string'.".to_string(),
            code: Some(2322),
            category: DiagnosticCategory::Error,
        }],
    );

    let for_script = f.service.diagnostics(&script_uri);
    assert_eq!(for_script.len(), 1);
    assert_eq!(for_script[0].range.start, pos(0, 4));
    assert!(f.service.diagnostics(&markup_uri).is_empty());
}

#[test]
fn transform_diagnostics_are_reported_with_the_rest() {
    let f = fixture();
    // An unterminated tag; the synthesizer keeps it as free text and
    // reports a transform diagnostic against it.
    let markup_uri = f.open("/ws/b.tpl", "Oops <Broken");

    let diagnostics = f.service.diagnostics(&markup_uri);
    assert_eq!(diagnostics.len(), 1);
    let diag = &diagnostics[0];
    assert_eq!(diag.message, "unterminated tag");
    assert_eq!(diag.range.start, pos(0, 5));
    assert_eq!(diag.range.end, pos(0, 6));
    assert_eq!(diag.severity, Some(DiagnosticSeverity::WARNING));
}

#[test]
fn unsupported_files_report_nothing() {
    let f = fixture();
    let uri = f.open("/ws/notes.txt", "hello");
    assert!(f.service.diagnostics(&uri).is_empty());
}

#[test]
fn loose_script_reports_nothing_until_allowed() {
    let f = fixture();
    let uri = f.open("/ws/c.js", "let x = 1;\n");

    let (synthetic_path, _) = {
        // Not analyzable yet, so there is no synthetic module to program.
        assert!(f.service.synthetic_text_for(&uri).is_none());

        f.service.apply_settings(stitch_ls::config::Settings {
            allow_loose_script: true,
            ..Default::default()
        });
        f.synthetic(&uri)
    };

    f.analyzer.set_semantic(
        &synthetic_path,
        vec![AnalyzerDiagnostic {
            file: synthetic_path.clone(),
            start: 4,
            length: 1,
            message: "unused".to_string(),
            code: Some(6133),
            category: DiagnosticCategory::Suggestion,
        }],
    );
    assert_eq!(f.service.diagnostics(&uri).len(), 1);
}
