//! Shared vocabulary for the halc compiler front end.
//!
//! Every other crate in this workspace (`halc-lexer`, `halc-parser`,
//! `halc-diagnostics`, `halcc`) depends on this one for `Span`,
//! `SourceBuffer`, the `ErrorKind` taxonomy, and the allocation-tracking
//! contract.

pub mod alloc;
pub mod error;
pub mod source;
pub mod span;

pub use error::ErrorKind;
pub use source::SourceBuffer;
pub use span::{LineIndex, Span};
