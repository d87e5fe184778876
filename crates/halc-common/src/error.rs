//! The error-kind taxonomy shared by every stage of the front end.

use std::fmt;

/// Every error kind a halc compilation can report, per the taxonomy in the
/// front end's error-handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // ── Resource ──────────────────────────────────────────────────────
    OutOfMemory,
    BadReallocParameters,
    ReallocShrunkWhenNotAllowed,

    // ── I/O (external to the core; kept here so the CLI can map to an
    // exit code alongside every other kind) ─────────────────────────────
    UnableToOpenFile,
    FileSeekError,

    // ── Normalization ────────────────────────────────────────────────
    InconsistentFileFormat,

    // ── Lex ──────────────────────────────────────────────────────────
    UnrecognizedToken,
    TokenizerPointerOverflow,

    // ── Parse ────────────────────────────────────────────────────────
    UnexpectedToken,
    UnableToParseLine,

    // ── Structural ───────────────────────────────────────────────────
    UnexpectedReinitialization,
    AssertionFailed,

    // ── Test-only ────────────────────────────────────────────────────
    TestLeakedMemory,
}

impl ErrorKind {
    /// Stable small integer used as the process exit code: 0 only ever
    /// means success, every kind below maps to a distinct nonzero value.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::OutOfMemory => 1,
            ErrorKind::BadReallocParameters => 2,
            ErrorKind::ReallocShrunkWhenNotAllowed => 3,
            ErrorKind::UnableToOpenFile => 4,
            ErrorKind::FileSeekError => 5,
            ErrorKind::InconsistentFileFormat => 6,
            ErrorKind::UnrecognizedToken => 7,
            ErrorKind::TokenizerPointerOverflow => 8,
            ErrorKind::UnexpectedToken => 9,
            ErrorKind::UnableToParseLine => 10,
            ErrorKind::UnexpectedReinitialization => 11,
            ErrorKind::AssertionFailed => 12,
            ErrorKind::TestLeakedMemory => 13,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::OutOfMemory => "out of memory",
            ErrorKind::BadReallocParameters => "bad realloc parameters",
            ErrorKind::ReallocShrunkWhenNotAllowed => "realloc shrunk when not allowed",
            ErrorKind::UnableToOpenFile => "unable to open file",
            ErrorKind::FileSeekError => "file seek error",
            ErrorKind::InconsistentFileFormat => "inconsistent file format",
            ErrorKind::UnrecognizedToken => "unrecognized token",
            ErrorKind::TokenizerPointerOverflow => "tokenizer pointer overflow",
            ErrorKind::UnexpectedToken => "unexpected token",
            ErrorKind::UnableToParseLine => "unable to parse line",
            ErrorKind::UnexpectedReinitialization => "unexpected reinitialization",
            ErrorKind::AssertionFailed => "assertion failed",
            ErrorKind::TestLeakedMemory => "test leaked memory",
        };
        f.write_str(s)
    }
}

impl std::error::Error for ErrorKind {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::UnrecognizedToken.to_string(), "unrecognized token");
        assert_eq!(ErrorKind::UnexpectedToken.to_string(), "unexpected token");
    }

    #[test]
    fn exit_codes_are_nonzero_and_distinct() {
        let kinds = [
            ErrorKind::OutOfMemory,
            ErrorKind::BadReallocParameters,
            ErrorKind::ReallocShrunkWhenNotAllowed,
            ErrorKind::UnableToOpenFile,
            ErrorKind::FileSeekError,
            ErrorKind::InconsistentFileFormat,
            ErrorKind::UnrecognizedToken,
            ErrorKind::TokenizerPointerOverflow,
            ErrorKind::UnexpectedToken,
            ErrorKind::UnableToParseLine,
            ErrorKind::UnexpectedReinitialization,
            ErrorKind::AssertionFailed,
            ErrorKind::TestLeakedMemory,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|&c| c != 0));
    }
}
