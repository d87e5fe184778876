//! Source normalizer and lexer for halc.
//!
//! `normalize` turns raw bytes into a canonical buffer (CRs stripped,
//! leading-space indentation folded into hard-tab markers). `Lexer` then
//! scans that buffer left to right, producing a flat [`Token`] stream with
//! line provenance.

mod cursor;
mod normalize;
mod stream;
mod token;

use cursor::Cursor;
use halc_common::{ErrorKind, Span};

pub use normalize::{normalize, NormalizeError};
pub use stream::TokenStream;
pub use token::{Token, TokenKind};

/// A lex failure. Lexing has no error recovery, so the lexer stops at the
/// first one.
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: ErrorKind,
    pub span: Span,
    /// The last token successfully emitted before the failure, printed for
    /// context by the diagnostic sink.
    pub last_good: Option<Token>,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for LexError {}

/// Converts normalized source text into a stream of tokens. Wraps a
/// [`Cursor`] for byte-level iteration and implements
/// `Iterator<Item = Result<Token, LexError>>` so callers can consume tokens
/// lazily or collect them into a `Vec`.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    line: u32,
    /// Directive-parenthesis nesting depth. Lexer-local, not parser-local
    /// (the parser has one mode; only the lexer needs to know whether `:`
    /// and `>` are inside a directive's argument list).
    paren_depth: u32,
    done: bool,
    /// A scan step can produce more than one token (the story-line head
    /// emits its sigil, then a separate STORY_TEXT token); extra tokens
    /// queue up here and drain before the cursor advances further.
    pending: Vec<Token>,
}

const MAX_POS: u32 = u32::MAX - 1;

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given (already normalized) source text.
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            line: 1,
            paren_depth: 0,
            done: false,
            pending: Vec::new(),
        }
    }

    /// Tokenize the entire source, stopping at the first lex error.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source).collect()
    }

    fn overflow_check(&self) -> Option<LexError> {
        if self.cursor.pos() >= MAX_POS {
            Some(LexError {
                kind: ErrorKind::TokenizerPointerOverflow,
                span: Span::at(self.cursor.pos()),
                last_good: None,
            })
        } else {
            None
        }
    }

    /// Scan and emit the comment token starting at the current `#`.
    fn lex_comment(&mut self) -> Token {
        let start = self.cursor.pos();
        // consume '#'
        self.cursor.advance();
        self.cursor.eat_while(|c| c != '\n');
        let end = self.cursor.pos();
        Token::new(TokenKind::Comment, start, end, self.line)
    }

    /// Scan the `:`/`>` story-line head: return the sigil token now, and
    /// queue the STORY_TEXT token (running up to, not including, the next
    /// newline/comment/EOF, trimmed of trailing spaces) to be returned next.
    /// Empty story text is permitted.
    fn lex_story_head(&mut self, sigil: TokenKind) -> Token {
        let sigil_start = self.cursor.pos();
        self.cursor.advance();
        let sigil_tok = Token::new(sigil, sigil_start, self.cursor.pos(), self.line);
        self.cursor.eat_while(|c| c == ' ');
        let text_start = self.cursor.pos();
        self.cursor.eat_while(|c| c != '\n' && c != '#');
        let text_end_raw = self.cursor.pos();
        let raw = self.cursor.slice(text_start, text_end_raw);
        let trimmed_len = raw.trim_end_matches(' ').len() as u32;
        let text_end = text_start + trimmed_len;
        self.pending.push(Token::new(TokenKind::StoryText, text_start, text_end, self.line));
        sigil_tok
    }

    fn lex_label(&mut self) -> Token {
        let start = self.cursor.pos();
        self.cursor
            .eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        Token::new(TokenKind::Label, start, self.cursor.pos(), self.line)
    }

    fn try_multi_byte_terminal(&mut self) -> Option<Token> {
        let start = self.cursor.pos();
        let c0 = self.cursor.peek()?;
        let c1 = self.cursor.peek_next();
        let kind = match (c0, c1) {
            ('!', Some('=')) => TokenKind::NotEquiv,
            ('=', Some('=')) => TokenKind::Equiv,
            ('<', Some('=')) => TokenKind::LessEq,
            ('>', Some('=')) => TokenKind::GreaterEq,
            _ => return None,
        };
        self.cursor.advance();
        self.cursor.advance();
        Some(Token::new(kind, start, self.cursor.pos(), self.line))
    }

    fn single_byte_terminal(&mut self, c: char) -> Option<TokenKind> {
        Some(match c {
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '@' => TokenKind::At,
            '<' => TokenKind::LAngle,
            '>' => TokenKind::RAngle,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '.' => TokenKind::Dot,
            '$' => TokenKind::Dollar,
            ' ' => TokenKind::Space,
            '\n' => TokenKind::Newline,
            '\r' => TokenKind::Cr,
            '\t' => TokenKind::Tab,
            '!' => TokenKind::Bang,
            '=' => TokenKind::Equals,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '#' => TokenKind::Hash,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '&' => TokenKind::Amp,
            '"' => TokenKind::DQuote,
            '\'' => TokenKind::SQuote,
            _ => return None,
        })
    }

    fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        if let Some(tok) = self.pending.pop() {
            return Some(Ok(tok));
        }
        if self.done {
            return None;
        }
        if let Some(err) = self.overflow_check() {
            self.done = true;
            return Some(Err(err));
        }
        let c = match self.cursor.peek() {
            None => {
                self.done = true;
                return None;
            }
            Some(c) => c,
        };

        // Rule 1: comment takes precedence over everything else on the line.
        if c == '#' {
            return Some(Ok(self.lex_comment()));
        }

        // Rule 2: story-line head, only outside a directive's parens.
        if (c == ':' || c == '>') && self.paren_depth == 0 {
            let sigil = if c == ':' {
                TokenKind::Colon
            } else {
                TokenKind::RAngle
            };
            return Some(Ok(self.lex_story_head(sigil)));
        }

        // Rule 3: terminals, longest match first.
        if let Some(tok) = self.try_multi_byte_terminal() {
            return Some(Ok(tok));
        }
        if let Some(kind) = self.single_byte_terminal(c) {
            let start = self.cursor.pos();
            self.cursor.advance();
            let end = self.cursor.pos();
            match kind {
                TokenKind::LParen => self.paren_depth += 1,
                TokenKind::RParen => self.paren_depth = self.paren_depth.saturating_sub(1),
                TokenKind::Newline => {
                    self.paren_depth = 0;
                    let tok = Token::new(kind, start, end, self.line);
                    self.line += 1;
                    return Some(Ok(tok));
                }
                _ => {}
            }
            return Some(Ok(Token::new(kind, start, end, self.line)));
        }

        // Rule 4: label.
        if c.is_ascii_alphanumeric() || c == '_' {
            return Some(Ok(self.lex_label()));
        }

        // Rule 5: unrecognized.
        self.done = true;
        Some(Err(LexError {
            kind: ErrorKind::UnrecognizedToken,
            span: Span::at(self.cursor.pos()),
            last_good: None,
        }))
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::tokenize(src)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_source_yields_empty_stream() {
        assert_eq!(Lexer::tokenize("").unwrap(), Vec::new());
    }

    #[test]
    fn segment_label() {
        assert_eq!(
            kinds("[hello]\n"),
            vec![
                TokenKind::LBracket,
                TokenKind::Label,
                TokenKind::RBracket,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn speech_line() {
        let toks = Lexer::tokenize("$: hi\n").unwrap();
        assert_eq!(
            toks.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Dollar, TokenKind::Colon, TokenKind::StoryText, TokenKind::Newline]
        );
        let story = &toks[2];
        assert_eq!(story.view.slice("$: hi\n"), "hi");
    }

    #[test]
    fn story_text_trims_trailing_spaces_before_comment() {
        let toks = Lexer::tokenize("$: hi   # note\n").unwrap();
        let src = "$: hi   # note\n";
        let story = toks.iter().find(|t| t.kind == TokenKind::StoryText).unwrap();
        assert_eq!(story.view.slice(src), "hi");
        assert!(toks.iter().any(|t| t.kind == TokenKind::Comment));
    }

    #[test]
    fn colon_inside_directive_parens_is_plain_terminal() {
        // Inside `(...)` a `:` must NOT trigger story-text scanning.
        let toks = Lexer::tokenize("@setVar(x: 2)\n").unwrap();
        assert!(toks.iter().any(|t| t.kind == TokenKind::Colon));
        assert!(!toks.iter().any(|t| t.kind == TokenKind::StoryText));
    }

    #[test]
    fn goto_with_dotted_label_chain() {
        assert_eq!(
            kinds("@goto region.sub\n"),
            vec![
                TokenKind::At,
                TokenKind::Label,
                TokenKind::Space,
                TokenKind::Label,
                TokenKind::Dot,
                TokenKind::Label,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn multi_byte_terminals_win_over_prefixes() {
        assert_eq!(kinds("!= == <= >=\n")[0], TokenKind::NotEquiv);
        assert_eq!(kinds("!= == <= >=\n")[2], TokenKind::Equiv);
        assert_eq!(kinds("!= == <= >=\n")[4], TokenKind::LessEq);
        assert_eq!(kinds("!= == <= >=\n")[6], TokenKind::GreaterEq);
    }

    #[test]
    fn bare_bang_and_equals_are_single_char() {
        assert_eq!(kinds("!=a\n")[0], TokenKind::NotEquiv);
        assert_eq!(kinds("! =\n"), vec![TokenKind::Bang, TokenKind::Space, TokenKind::Equals, TokenKind::Newline]);
    }

    #[test]
    fn unrecognized_token_is_fatal() {
        let err = Lexer::tokenize("~\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnrecognizedToken);
    }

    #[test]
    fn comment_only_line() {
        assert_eq!(kinds("# just a comment\n"), vec![TokenKind::Comment, TokenKind::Newline]);
    }

    #[test]
    fn line_numbers_increment_on_newline() {
        let toks = Lexer::tokenize("[a]\n[b]\n").unwrap();
        let lines: Vec<u32> = toks.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn trailing_line_without_newline_still_tokenizes() {
        let toks = Lexer::tokenize("[hello]").unwrap();
        assert_eq!(toks.last().unwrap().kind, TokenKind::RBracket);
    }

    #[test]
    fn token_views_are_verbatim_slices() {
        let src = "[hello]\n";
        for tok in Lexer::tokenize(src).unwrap() {
            let slice = tok.view.slice(src);
            assert_eq!(slice.len(), tok.view.len() as usize);
        }
    }
}
