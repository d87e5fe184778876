//! Integration tests parsing whole fixture files end to end.

use halc_lexer::Lexer;
use halc_parser::{parse, NodeKind, ROOT};

fn parse_fixture(path: &str) -> halc_parser::ParseOutput {
    let raw = std::fs::read(path).expect("fixture file must exist");
    let text = halc_lexer::normalize(&raw).expect("fixture must normalize cleanly");
    let tokens = Lexer::tokenize(&text).expect("fixture must lex cleanly");
    parse(tokens, &text).expect("fixture must parse without a fatal error")
}

#[test]
fn greeting_fixture_has_two_segment_labels() {
    let out = parse_fixture(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/fixtures/greeting.halc"
    ));
    assert!(out.diagnostics.is_empty());
    let children = match &out.arena.get(ROOT).kind {
        NodeKind::Graph { children } => out.indices.window(*children),
        other => panic!("unexpected root kind: {other:?}"),
    };
    let segment_labels = children
        .iter()
        .filter(|&&idx| matches!(out.arena.get(idx as u32).kind, NodeKind::SegmentLabel { .. }))
        .count();
    assert_eq!(segment_labels, 2);
}

#[test]
fn directives_fixture_has_a_goto_with_dotted_chain() {
    let out = parse_fixture(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/fixtures/directives.halc"
    ));
    assert!(out.diagnostics.is_empty());
    let children = match &out.arena.get(ROOT).kind {
        NodeKind::Graph { children } => out.indices.window(*children),
        other => panic!("unexpected root kind: {other:?}"),
    };
    let goto = children
        .iter()
        .find_map(|&idx| match &out.arena.get(idx as u32).kind {
            NodeKind::Goto { label_chain, .. } => Some(*label_chain),
            _ => None,
        })
        .expect("fixture has a @goto line");
    assert_eq!(out.indices.window(goto).len(), 3);
}
