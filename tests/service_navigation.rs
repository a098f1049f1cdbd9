//! Hover, definition and references through the orchestrator, across both
//! halves of a logical module.


use fixtures::{find, fixture, pos, span, uri};
use stitch_ls::analyzer::QuickInfo;

#[test]
fn hover_on_a_tag_resolves_into_the_companion_script() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    let markup_uri = f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, synthetic_text) = f.synthetic(&script_uri);
    let class_name = find(&synthetic_text, "class A") + 6;
    f.analyzer.set_quick_info(
        &synthetic_path,
        QuickInfo {
            start: class_name,
            end: class_name + 1,
            display: "class A".to_string(),
            documentation: Some("The A component.".to_string()),
        },
    );

    let info = f.service.hover(&markup_uri, pos(0, 7)).unwrap();
    assert_eq!(info.display, "class A");
    assert_eq!(info.documentation.as_deref(), Some("The A component."));
    assert_eq!(info.location.uri, uri("/ws/a.ts"));
    assert_eq!(info.location.range.start, pos(0, 13));
    assert_eq!(info.location.range.end, pos(0, 14));
}

#[test]
fn hover_landing_in_glue_is_suppressed() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    let markup_uri = f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, synthetic_text) = f.synthetic(&script_uri);
    // The `new ` glue in front of the mapped tag name.
    let glue = find(&synthetic_text, "new A");
    f.analyzer.set_quick_info(
        &synthetic_path,
        QuickInfo {
            start: glue,
            end: glue + 3,
            display: "glue".to_string(),
            documentation: None,
        },
    );

    assert!(f.service.hover(&markup_uri, pos(0, 7)).is_none());
}

#[test]
fn definition_from_markup_jumps_to_the_script_declaration() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    let markup_uri = f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, synthetic_text) = f.synthetic(&script_uri);
    let class_name = find(&synthetic_text, "class A") + 6;
    f.analyzer.set_definitions(
        &synthetic_path,
        vec![span(&synthetic_path, class_name, class_name + 1)],
    );

    let locations = f.service.definition(&markup_uri, pos(0, 7));
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].uri, uri("/ws/a.ts"));
    assert_eq!(locations[0].range.start, pos(0, 13));
    assert_eq!(locations[0].range.end, pos(0, 14));
}

#[test]
fn references_span_both_halves_and_drop_synthetic_usages() {
    let f = fixture();
    let script_uri = f.open("/ws/a.ts", "export class A {}\n");
    f.open("/ws/a.tpl", "Hello <A/>!");

    let (synthetic_path, synthetic_text) = f.synthetic(&script_uri);
    let class_name = find(&synthetic_text, "class A") + 6;
    let tag_name = find(&synthetic_text, "new A") + 4;
    let glue_call = find(&synthetic_text, "();");
    f.analyzer.set_references(
        &synthetic_path,
        vec![
            span(&synthetic_path, class_name, class_name + 1),
            span(&synthetic_path, tag_name, tag_name + 1),
            // The generated call parens exist only in the synthetic text.
            span(&synthetic_path, glue_call, glue_call + 2),
        ],
    );

    let locations = f.service.references(&script_uri, pos(0, 13));
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].uri, uri("/ws/a.ts"));
    assert_eq!(locations[0].range.start, pos(0, 13));
    assert_eq!(locations[1].uri, uri("/ws/a.tpl"));
    assert_eq!(locations[1].range.start, pos(0, 7));
    assert_eq!(locations[1].range.end, pos(0, 8));
}

#[test]
fn requests_outside_any_module_degrade_to_empty() {
    let f = fixture();
    let uri = f.open("/ws/notes.txt", "hello");
    assert!(f.service.hover(&uri, pos(0, 0)).is_none());
    assert!(f.service.definition(&uri, pos(0, 0)).is_empty());
    assert!(f.service.references(&uri, pos(0, 0)).is_empty());
}
