//! The shift-reduce parser: consumes a token stream, maintains a bounded
//! working stack of arena-node indices, and folds each recognized line into
//! exactly one child of the root Graph.
//!
//! The parser is neither pure LR nor recursive-descent. After every shift it
//! tries, in order: indent/space absorption, a forward-match against the
//! just-completed line (only attempted once the line's trailing NEWLINE is
//! on top), and line-eviction recovery for lines that matched nothing. Each
//! step is retried to a fixpoint before the next token is shifted.

use halc_common::{ErrorKind, Span};
use halc_lexer::{Token, TokenKind};

use crate::ast::{Arena, NodeKind, ROOT};
use crate::error::{FatalParseError, ParseDiagnostic};
use crate::index_list::IndexList;

/// Everything the parser produces: the populated arena, its shared
/// index-list pool, and any recoverable diagnostics collected along the
/// way (an empty vec means a clean parse).
pub struct ParseOutput {
    pub arena: Arena,
    pub indices: IndexList,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parse a token stream into an AST arena.
///
/// `tokens` need not end in a `NEWLINE` -- a trailing unterminated line gets
/// a synthetic one appended first, so the final line still reduces.
pub fn parse(mut tokens: Vec<Token>, source: &str) -> Result<ParseOutput, FatalParseError> {
    if let Some(last) = tokens.last() {
        if last.kind != TokenKind::Newline {
            let end = last.view.end;
            let line = last.line;
            tokens.push(Token::new(TokenKind::Newline, end, end, line));
        }
    }
    let mut parser = Parser::new(tokens, source);
    let count = parser.tokens.len();
    for i in 0..count {
        parser.shift(i);
        parser.reduce_to_fixpoint()?;
    }
    Ok(parser.finalize())
}

struct Parser<'src> {
    tokens: Vec<Token>,
    source: &'src str,
    arena: Arena,
    indices: IndexList,
    /// Working stack of arena node indices. `stack[0]` is always `ROOT` and
    /// is never popped; everything above it is the line currently in
    /// progress (prior lines are always folded away before the next shift).
    stack: Vec<u32>,
    indent: u32,
    /// Nesting depth of unclosed `LParen`s shifted in the line currently in
    /// progress. While positive, `try_absorb` must not swallow `Space` --
    /// a directive's argument list is stored verbatim between its parens.
    paren_depth: u32,
    diagnostics: Vec<ParseDiagnostic>,
    /// Node indices of Graph's direct children, in source order. Appended
    /// to the shared `IndexList` only once, at the very end -- Graph is the
    /// one node whose window can't close at creation, since its children
    /// accumulate across the whole parse instead of a single reduction.
    top_level_children: Vec<i32>,
    /// The most recent Speech/Selection that a subsequent Extension line
    /// should attach its count to. Cleared by any other top-level construct.
    last_extendable: Option<u32>,
}

impl<'src> Parser<'src> {
    fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            source,
            arena: Arena::new(),
            indices: IndexList::new(),
            stack: vec![ROOT],
            indent: 0,
            paren_depth: 0,
            diagnostics: Vec::new(),
            top_level_children: Vec::new(),
            last_extendable: None,
        }
    }

    fn finalize(mut self) -> ParseOutput {
        self.flush_trailing_line();
        let start = self.indices.start();
        for child in &self.top_level_children {
            self.indices.push_index(*child);
        }
        let window = self.indices.close(start);
        self.arena.get_mut(ROOT).kind = NodeKind::Graph { children: window };
        ParseOutput {
            arena: self.arena,
            indices: self.indices,
            diagnostics: self.diagnostics,
        }
    }

    // ── Shift ────────────────────────────────────────────────────────────

    fn shift(&mut self, token_idx: usize) {
        let idx = self.arena.new_node(ROOT, NodeKind::Terminal { token: token_idx as u32 });
        self.stack.push(idx);
        match self.tokens[token_idx].kind {
            TokenKind::LParen => self.paren_depth += 1,
            TokenKind::RParen => self.paren_depth = self.paren_depth.saturating_sub(1),
            _ => {}
        }
    }

    fn token_kind_of(&self, node_idx: u32) -> Option<TokenKind> {
        match self.arena.get(node_idx).kind {
            NodeKind::Terminal { token } => Some(self.tokens[token as usize].kind),
            _ => None,
        }
    }

    fn token_of(&self, node_idx: u32) -> u32 {
        match self.arena.get(node_idx).kind {
            NodeKind::Terminal { token } => token,
            _ => unreachable!("token_of called on a non-terminal arena node"),
        }
    }

    fn span_of(&self, node_idx: u32) -> Span {
        self.tokens[self.token_of(node_idx) as usize].view
    }

    fn label_text(&self, node_idx: u32) -> &'src str {
        self.span_of(node_idx).slice(self.source)
    }

    // ── Reduce fixpoint ──────────────────────────────────────────────────

    fn reduce_to_fixpoint(&mut self) -> Result<(), FatalParseError> {
        loop {
            if self.try_absorb() {
                continue;
            }
            if self.try_forward_match()? {
                continue;
            }
            if self.try_line_eviction() {
                continue;
            }
            break;
        }
        Ok(())
    }

    fn try_absorb(&mut self) -> bool {
        if self.stack.len() <= 1 {
            return false;
        }
        let top = *self.stack.last().unwrap();
        match self.token_kind_of(top) {
            Some(TokenKind::Tab) => {
                self.stack.pop();
                self.indent += 1;
                true
            }
            Some(TokenKind::Space) if self.paren_depth == 0 => {
                self.stack.pop();
                true
            }
            _ => false,
        }
    }

    fn try_line_eviction(&mut self) -> bool {
        if self.stack.len() <= 2 {
            return false;
        }
        let top = *self.stack.last().unwrap();
        if self.token_kind_of(top) == Some(TokenKind::Newline) {
            // The stale newline itself is on top; nothing has been shifted
            // past it yet, so there is nothing to evict.
            return false;
        }
        let body = &self.stack[1..self.stack.len() - 1];
        let has_stale_newline = body
            .iter()
            .any(|&idx| self.token_kind_of(idx) == Some(TokenKind::Newline));
        if !has_stale_newline {
            return false;
        }

        let span = self.span_of(self.stack[1]).merge(self.span_of(top));
        let most_recent = self.stack.pop().unwrap();
        self.stack.truncate(1);
        self.stack.push(most_recent);
        self.indent = 0;
        self.paren_depth = 0;
        self.last_extendable = None;

        self.diagnostics.push(ParseDiagnostic::new(
            ErrorKind::UnableToParseLine,
            "unable to parse line; discarding it and resuming at the next token",
            span,
        ));
        true
    }

    /// Discard whatever is left on the stack once the token loop has run
    /// out of input. A non-blank line that never reduced (no terminal was
    /// ever shifted past its stale `NEWLINE`, so `try_line_eviction` never
    /// got a chance to fire) would otherwise vanish from the Graph with no
    /// diagnostic -- this is the end-of-input counterpart to that recovery.
    fn flush_trailing_line(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let span = self.span_of(self.stack[1]).merge(self.span_of(*self.stack.last().unwrap()));
        self.stack.truncate(1);
        self.paren_depth = 0;
        self.diagnostics.push(ParseDiagnostic::new(
            ErrorKind::UnableToParseLine,
            "unable to parse line; discarding it at end of input",
            span,
        ));
    }

    // ── Forward-match ────────────────────────────────────────────────────

    fn try_forward_match(&mut self) -> Result<bool, FatalParseError> {
        if self.stack.len() <= 1 {
            return Ok(false);
        }
        let top = *self.stack.last().unwrap();
        if self.token_kind_of(top) != Some(TokenKind::Newline) {
            return Ok(false);
        }

        let window: Vec<u32> = self.stack[1..].to_vec();
        let kinds: Vec<TokenKind> = window
            .iter()
            .map(|&idx| self.token_kind_of(idx).expect("line window holds only terminals"))
            .collect();

        if let Some(node) = self.match_segment_label(&window, &kinds)? {
            self.commit_line(node, window.len(), None);
            return Ok(true);
        }
        if let Some(node) = self.match_goto(&window, &kinds) {
            self.commit_line(node, window.len(), None);
            return Ok(true);
        }
        if let Some(node) = self.match_end(&window, &kinds) {
            self.commit_line(node, window.len(), None);
            return Ok(true);
        }
        if let Some(node) = self.match_directive(&window, &kinds) {
            self.commit_line(node, window.len(), None);
            return Ok(true);
        }
        if let Some(node) = self.match_speech(&window, &kinds) {
            self.commit_line(node, window.len(), None);
            return Ok(true);
        }
        if let Some(node) = self.match_extension(&window, &kinds) {
            self.commit_line(node, window.len(), Some(Extend::Extension));
            return Ok(true);
        }
        if let Some(node) = self.match_selection(&window, &kinds) {
            self.commit_line(node, window.len(), None);
            return Ok(true);
        }
        if self.match_newline_swallow(&kinds) {
            self.stack.truncate(self.stack.len() - window.len());
            self.indent = 0;
            self.paren_depth = 0;
            return Ok(true);
        }

        Ok(false)
    }

    /// Consume `window_len` stack entries, set their `parent` to `node`,
    /// append `node` to Graph's children, and reset line-local state.
    fn commit_line(&mut self, node: u32, window_len: usize, extend: Option<Extend>) {
        let start = self.stack.len() - window_len;
        for &idx in &self.stack[start..] {
            self.arena.set_parent(idx, node);
        }
        self.stack.truncate(start);
        self.indent = 0;
        self.paren_depth = 0;

        match extend {
            Some(Extend::Extension) => {
                if let Some(prev) = self.last_extendable {
                    if let NodeKind::Speech { extension_count, .. }
                    | NodeKind::Selection { extension_count, .. } = &mut self.arena.get_mut(prev).kind
                    {
                        *extension_count += 1;
                    }
                }
            }
            None => {
                let is_extendable = matches!(
                    self.arena.get(node).kind,
                    NodeKind::Speech { .. } | NodeKind::Selection { .. }
                );
                self.last_extendable = if is_extendable { Some(node) } else { None };
            }
        }
        self.top_level_children.push(node as i32);
    }

    /// Split a `[prefix...] [COMMENT]? NEWLINE` window into the prefix
    /// length and the optional trailing comment's terminal index, or `None`
    /// if anything other than an optional comment sits before the newline.
    fn strip_trailing_comment(
        &self,
        window: &[u32],
        kinds: &[TokenKind],
        prefix_len: usize,
    ) -> Option<Option<u32>> {
        let body = &kinds[prefix_len..kinds.len() - 1]; // excludes final NEWLINE
        match body {
            [] => Some(None),
            [TokenKind::Comment] => Some(Some(self.token_of(window[prefix_len]))),
            _ => None,
        }
    }

    fn match_segment_label(
        &mut self,
        window: &[u32],
        kinds: &[TokenKind],
    ) -> Result<Option<u32>, FatalParseError> {
        if kinds.len() < 4 || kinds[0] != TokenKind::LBracket {
            return Ok(None);
        }
        if kinds[1] != TokenKind::Label || kinds[2] != TokenKind::RBracket {
            return Ok(None);
        }
        let body = &kinds[3..kinds.len() - 1];
        let comment_tok = match body {
            [] => None,
            [TokenKind::Comment] => Some(self.token_of(window[3])),
            _ => {
                let offender = window[3];
                return Err(FatalParseError {
                    diagnostic: ParseDiagnostic::new(
                        ErrorKind::UnexpectedToken,
                        "unexpected token after `]` in segment label",
                        self.span_of(offender),
                    ),
                });
            }
        };
        let label_tok = self.token_of(window[1]);
        let indent = self.indent;
        let node = self.arena.new_node(
            ROOT,
            NodeKind::SegmentLabel { label_tok, comment_tok, indent },
        );
        Ok(Some(node))
    }

    fn match_goto(&mut self, window: &[u32], kinds: &[TokenKind]) -> Option<u32> {
        if kinds.len() < 4 || kinds[0] != TokenKind::At || kinds[1] != TokenKind::Label {
            return None;
        }
        if self.label_text(window[1]) != "goto" {
            return None;
        }
        if kinds[2] == TokenKind::LParen {
            // Disambiguates `@goto(...)` as a directive literally named "goto".
            return None;
        }
        let newline_at = kinds.len() - 1;
        let (chain_end, comment_tok) = match kinds[newline_at - 1] {
            TokenKind::Comment => (newline_at - 1, Some(self.token_of(window[newline_at - 1]))),
            _ => (newline_at, None),
        };
        let _ = comment_tok; // Goto carries no comment field in the AST payload.
        if chain_end <= 2 {
            return None;
        }
        for k in &kinds[2..chain_end] {
            if *k != TokenKind::Label && *k != TokenKind::Dot {
                return None;
            }
        }
        let start = self.indices.start();
        for &idx in &window[2..chain_end] {
            self.indices.push_index(self.token_of(idx) as i32);
        }
        let label_chain = self.indices.close(start);
        let indent = self.indent;
        Some(self.arena.new_node(ROOT, NodeKind::Goto { label_chain, indent }))
    }

    fn match_end(&mut self, window: &[u32], kinds: &[TokenKind]) -> Option<u32> {
        if kinds.len() < 3 || kinds[0] != TokenKind::At || kinds[1] != TokenKind::Label {
            return None;
        }
        if self.label_text(window[1]) != "end" {
            return None;
        }
        self.strip_trailing_comment(window, kinds, 2)?;
        let token = self.token_of(window[0]);
        Some(self.arena.new_node(ROOT, NodeKind::End { token }))
    }

    fn match_directive(&mut self, window: &[u32], kinds: &[TokenKind]) -> Option<u32> {
        if kinds.len() < 5 || kinds[0] != TokenKind::At || kinds[1] != TokenKind::Label {
            return None;
        }
        if kinds[2] != TokenKind::LParen {
            return None;
        }
        let rparen_pos = kinds[3..].iter().position(|k| *k == TokenKind::RParen)? + 3;
        self.strip_trailing_comment(window, kinds, rparen_pos + 1)?;
        let command_label_tok = self.token_of(window[1]);
        let start = self.indices.start();
        for &idx in &window[3..rparen_pos] {
            self.indices.push_index(self.token_of(idx) as i32);
        }
        let inner_tokens = self.indices.close(start);
        let indent = self.indent;
        Some(self.arena.new_node(
            ROOT,
            NodeKind::Directive { command_label_tok, inner_tokens, indent },
        ))
    }

    fn match_speech(&mut self, window: &[u32], kinds: &[TokenKind]) -> Option<u32> {
        if kinds.len() < 4 {
            return None;
        }
        if kinds[0] != TokenKind::Dollar && kinds[0] != TokenKind::Label {
            return None;
        }
        if kinds[1] != TokenKind::Colon || kinds[2] != TokenKind::StoryText {
            return None;
        }
        let comment_tok = self.strip_trailing_comment(window, kinds, 3)?;
        let speaker_tok = self.token_of(window[0]);
        let story_text_tok = self.token_of(window[2]);
        let indent = self.indent;
        Some(self.arena.new_node(
            ROOT,
            NodeKind::Speech {
                speaker_tok,
                story_text_tok,
                comment_tok,
                indent,
                extension_count: 0,
            },
        ))
    }

    fn match_extension(&mut self, window: &[u32], kinds: &[TokenKind]) -> Option<u32> {
        if kinds.len() < 3 || kinds[0] != TokenKind::Colon || kinds[1] != TokenKind::StoryText {
            return None;
        }
        let text_tok = self.token_of(window[1]);
        let indent = self.indent;
        Some(self.arena.new_node(ROOT, NodeKind::Extension { text_tok, indent }))
    }

    fn match_selection(&mut self, window: &[u32], kinds: &[TokenKind]) -> Option<u32> {
        if kinds.len() < 3 || kinds[0] != TokenKind::RAngle || kinds[1] != TokenKind::StoryText {
            return None;
        }
        let comment_tok = self.strip_trailing_comment(window, kinds, 2)?;
        let story_text_tok = self.token_of(window[1]);
        let indent = self.indent;
        Some(self.arena.new_node(
            ROOT,
            NodeKind::Selection { story_text_tok, comment_tok, indent, extension_count: 0 },
        ))
    }

    fn match_newline_swallow(&self, kinds: &[TokenKind]) -> bool {
        matches!(kinds, [TokenKind::Newline] | [TokenKind::Comment, TokenKind::Newline])
    }
}

enum Extend {
    Extension,
}
