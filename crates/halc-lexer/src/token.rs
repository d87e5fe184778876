use halc_common::Span;
use serde::Serialize;

/// A token produced by the halc lexer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub view: Span,
    pub line: u32,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32, line: u32) -> Self {
        Self {
            kind,
            view: Span::new(start, end),
            line,
        }
    }
}

/// Every kind of token the halc lexer produces.
///
/// Fixed terminals are ordered so that longer matches are tried before their
/// shorter prefixes (`!=` before `!`, etc.) -- see [`crate::Lexer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    // ── Multi-byte terminals (checked before their single-char prefixes) ──
    /// `!=`
    NotEquiv,
    /// `==`
    Equiv,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,

    // ── Single-byte terminals ──────────────────────────────────────────
    LBracket,
    RBracket,
    At,
    LAngle,
    RAngle,
    Colon,
    LParen,
    RParen,
    Dot,
    /// `$` -- the speaker sigil.
    Dollar,
    Space,
    Newline,
    /// Carriage return. The normalizer strips `\r` unconditionally before
    /// the lexer ever runs, so this variant is reachable only if a caller
    /// hands the lexer un-normalized text directly.
    Cr,
    Tab,
    Bang,
    Equals,
    LBrace,
    RBrace,
    Hash,
    Plus,
    Minus,
    Comma,
    Semicolon,
    Amp,
    DQuote,
    SQuote,

    // ── Structural ──────────────────────────────────────────────────────
    /// A maximal run of `[A-Za-z0-9_]`.
    Label,
    /// The trimmed payload after a `:` or `>` up to end-of-line or `#`.
    StoryText,
    /// A `#` to end-of-line.
    Comment,
}
