//! The halc dialogue-graph compiler front end.
//!
//! [`compile`] runs the three pipeline stages -- [normalize](halc_lexer::normalize),
//! lex, parse -- over a raw source buffer and returns a [`Graph`] bundling
//! the arena, its shared index pool, and the buffer/token stream that every
//! node's fields point back into.

use std::io::Write;

use halc_common::alloc::AllocTracker;
use halc_common::{ErrorKind, SourceBuffer};
use halc_diagnostics::{Diagnostic, Sink};
use halc_lexer::{normalize, Lexer, TokenStream};
use halc_parser::{parse as parse_tokens, Arena, IndexList, NodeKind, ROOT};

/// A fully parsed compilation unit. `buffer` and `tokens` must outlive any
/// borrow derived from `arena`'s token indices, which is why they travel
/// together instead of being dropped once parsing finishes -- diagnostics
/// rendered later still need to slice the original text.
pub struct Graph {
    pub buffer: SourceBuffer,
    pub tokens: TokenStream,
    pub arena: Arena,
    pub indices: IndexList,
}

impl Graph {
    /// The root node's direct children, in source order.
    pub fn children(&self) -> &[i32] {
        match &self.arena.get(ROOT).kind {
            NodeKind::Graph { children } => self.indices.window(*children),
            _ => unreachable!("node 0 is always the Graph root"),
        }
    }
}

/// A compilation failure severe enough that no `Graph` was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub message: String,
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CompileError {}

/// Run normalize -> lex -> parse over `raw`, reporting every diagnostic
/// (normalizer and parser alike) through `sink` before returning.
///
/// `tracker` observes allocation traffic across the whole pipeline under
/// one labeled scope; pass [`halc_common::alloc::NullTracker`] when the
/// caller hasn't opted into tracking.
pub fn compile<W: Write>(
    raw: &[u8],
    filename: &str,
    sink: &mut Sink<W>,
    tracker: &mut dyn AllocTracker,
) -> Result<Graph, CompileError> {
    tracker.track("compile");
    let result = compile_inner(raw, filename, sink, tracker);
    let stats = tracker.untrack();
    if tracker.enabled() && !stats.is_balanced() {
        sink.emit(
            Diagnostic::new(
                ErrorKind::TestLeakedMemory,
                format!(
                    "allocation tracking reported an imbalance: {} allocs, {} frees, {} bytes outstanding",
                    stats.allocations, stats.frees, stats.bytes_in_use
                ),
                halc_common::Span::at(0),
            ),
            filename,
            "",
        );
    }
    result
}

fn compile_inner<W: Write>(
    raw: &[u8],
    filename: &str,
    sink: &mut Sink<W>,
    tracker: &mut dyn AllocTracker,
) -> Result<Graph, CompileError> {
    let text = match normalize(raw) {
        Ok(text) => text,
        Err(e) => {
            let span = halc_common::Span::new(
                e.line_offset,
                e.line_offset + e.prefix.len() as u32,
            );
            let diag = Diagnostic::new(e.kind, e.to_string(), span);
            sink.emit(diag, filename, "");
            return Err(CompileError { kind: e.kind, message: e.to_string() });
        }
    };

    tracker.on_alloc(text.len());
    let buffer = SourceBuffer::new(filename.to_string(), text);

    let tokens = match Lexer::tokenize(buffer.text()) {
        Ok(tokens) => tokens,
        Err(e) => {
            let diag = Diagnostic::new(e.kind, e.to_string(), e.span);
            sink.emit(diag, filename, buffer.text());
            return Err(CompileError { kind: e.kind, message: e.to_string() });
        }
    };
    let token_count = tokens.len();
    tracker.on_alloc(token_count * std::mem::size_of::<halc_lexer::Token>());
    let token_stream = TokenStream::new(tokens.clone(), filename.to_string());

    let output = match parse_tokens(tokens, buffer.text()) {
        Ok(output) => output,
        Err(e) => {
            let diag = Diagnostic::new(e.diagnostic.kind, e.diagnostic.message.clone(), e.diagnostic.span);
            sink.emit(diag, filename, buffer.text());
            return Err(CompileError { kind: e.diagnostic.kind, message: e.diagnostic.to_string() });
        }
    };

    for d in &output.diagnostics {
        sink.emit(
            Diagnostic::new(d.kind, d.message.clone(), d.span),
            filename,
            buffer.text(),
        );
    }

    Ok(Graph {
        buffer,
        tokens: token_stream,
        arena: output.arena,
        indices: output.indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use halc_common::alloc::NullTracker;

    fn compile_ok(src: &str) -> Graph {
        let mut sink = Sink::new(Vec::new());
        let mut tracker = NullTracker::new();
        compile(src.as_bytes(), "demo.halc", &mut sink, &mut tracker)
            .expect("fixture source must compile cleanly")
    }

    #[test]
    fn compiles_a_segment_label() {
        let graph = compile_ok("[hello]\n");
        assert_eq!(graph.children().len(), 1);
    }

    #[test]
    fn recoverable_parse_errors_still_produce_a_graph() {
        let mut sink = Sink::new(Vec::new());
        let mut tracker = NullTracker::new();
        let graph = compile(b"[broken label\n$: next\n", "demo.halc", &mut sink, &mut tracker)
            .expect("recoverable errors must not fail the whole compilation");
        assert_eq!(graph.children().len(), 1);
        assert!(!sink.emitted().is_empty());
    }

    #[test]
    fn inconsistent_indentation_is_fatal() {
        let mut sink = Sink::new(Vec::new());
        let mut tracker = NullTracker::new();
        let err = compile(b"   [hello]\n", "demo.halc", &mut sink, &mut tracker).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InconsistentFileFormat);
    }

    #[test]
    fn suppressed_sink_does_not_write_but_compile_still_succeeds() {
        let mut sink = Sink::new(Vec::new());
        sink.set_suppressed(true);
        let mut tracker = NullTracker::new();
        let graph = compile(b"[hello]\n", "demo.halc", &mut sink, &mut tracker).unwrap();
        assert_eq!(graph.children().len(), 1);
    }
}
