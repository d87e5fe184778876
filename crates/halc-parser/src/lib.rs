//! Shift-reduce parser and AST arena for the halc dialogue-graph language.
//!
//! [`parse`] is the crate's single entry point: feed it the token stream
//! produced by `halc-lexer` and it returns a populated [`ast::Arena`] plus
//! the shared [`index_list::IndexList`] pool backing every node's
//! variable-length child window.

pub mod ast;
pub mod error;
pub mod index_list;
mod parser;

pub use ast::{Arena, Node, NodeKind, ROOT};
pub use error::{FatalParseError, ParseDiagnostic};
pub use index_list::{IndexList, IndexWindow};
pub use parser::{parse, ParseOutput};
