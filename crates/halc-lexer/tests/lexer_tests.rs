//! Integration tests driving the public `Lexer` API over whole fixture
//! files, rather than the hand-written snippets covered by the crate's
//! inline unit tests.

use halc_lexer::{normalize, Lexer, TokenKind};

fn lex_fixture(path: &str) -> Vec<TokenKind> {
    let raw = std::fs::read(path).expect("fixture file must exist");
    let text = normalize(&raw).expect("fixture must normalize cleanly");
    Lexer::tokenize(&text)
        .expect("fixture must lex cleanly")
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn greeting_fixture_lexes_without_error() {
    let kinds = lex_fixture(concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/greeting.halc"));
    assert!(kinds.contains(&TokenKind::LBracket));
    assert!(kinds.contains(&TokenKind::Dollar));
    assert!(kinds.contains(&TokenKind::RAngle));
    assert!(kinds.contains(&TokenKind::At));
}

#[test]
fn directives_fixture_lexes_without_error() {
    let kinds = lex_fixture(concat!(env!("CARGO_MANIFEST_DIR"), "/../../tests/fixtures/directives.halc"));
    assert!(kinds.contains(&TokenKind::LParen));
    assert!(kinds.contains(&TokenKind::RParen));
    assert!(kinds.contains(&TokenKind::Comment));
    assert!(kinds.contains(&TokenKind::Dot));
}
