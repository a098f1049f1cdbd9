//! Completions through the orchestrator, including the "no completions in
//! free markup text" rule and lazy detail resolution.


use fixtures::{fixture, pos};
use stitch_ls::analyzer::CompletionEntry;
use tower_lsp_server::ls_types::CompletionItemKind;

fn greet_entry() -> CompletionEntry {
    CompletionEntry {
        name: "greet".to_string(),
        kind: "function".to_string(),
        sort_text: Some("11".to_string()),
        insert_text: None,
        source: None,
    }
}

#[test]
fn script_positions_offer_completions() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, _) = f.synthetic(&script_uri);
    f.analyzer
        .set_completions(&synthetic_path, vec![greet_entry()]);

    let items = f
        .service
        .completions(&script_uri, pos(0, 16))
        .expect("script positions reach the engine");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].label, "greet");
    assert_eq!(items[0].kind, Some(CompletionItemKind::FUNCTION));
    assert_eq!(items[0].sort_text.as_deref(), Some("11"));
    assert!(items[0].data.is_some(), "resolution context is attached");
}

#[test]
fn free_markup_text_offers_none_even_when_the_engine_would_answer() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    let markup_uri = f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, _) = f.synthetic(&script_uri);
    f.analyzer
        .set_completions(&synthetic_path, vec![greet_entry()]);

    // Inside the "Hello " run.
    assert_eq!(f.service.completions(&markup_uri, pos(0, 2)), None);
    // On the tag name, which is markup structure, not script content.
    assert_eq!(f.service.completions(&markup_uri, pos(0, 7)), None);
}

#[test]
fn resolution_round_trips_through_the_attached_context() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");

    let (synthetic_path, _) = f.synthetic(&script_uri);
    f.analyzer
        .set_completions(&synthetic_path, vec![greet_entry()]);

    let item = f
        .service
        .completions(&script_uri, pos(0, 16))
        .unwrap()
        .remove(0);
    let resolved = f.service.resolve_completion(item);
    assert_eq!(resolved.detail.as_deref(), Some("details for greet"));
}

#[test]
fn items_without_our_context_resolve_unchanged() {
    let f = fixture();
    let item = tower_lsp_server::ls_types::CompletionItem {
        label: "foreign".to_string(),
        ..Default::default()
    };
    let resolved = f.service.resolve_completion(item);
    assert_eq!(resolved.label, "foreign");
    assert_eq!(resolved.detail, None);
}
