//! Parse diagnostics and the parser's fatal-error type.

use halc_common::{ErrorKind, Span};
use std::fmt;

/// A parse diagnostic with location information and an optional related
/// span (primary span, message, optional "opened here"-style related span).
#[derive(Debug, Clone, PartialEq)]
pub struct ParseDiagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub related: Option<(String, Span)>,
}

impl ParseDiagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            related: None,
        }
    }

    pub fn with_related(
        kind: ErrorKind,
        message: impl Into<String>,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            related: Some((related_message.into(), related_span)),
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseDiagnostic {}

/// A fatal parse failure: the function returns immediately, no `Graph` is
/// produced. Distinct from [`ParseDiagnostic`], which is recoverable.
#[derive(Debug, Clone, PartialEq)]
pub struct FatalParseError {
    pub diagnostic: ParseDiagnostic,
}

impl fmt::Display for FatalParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.diagnostic)
    }
}

impl std::error::Error for FatalParseError {}
