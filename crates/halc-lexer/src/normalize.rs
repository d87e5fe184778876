//! The source normalizer: strips `\r`, folds leading-space indentation into
//! hard-tab markers, and rejects inconsistent indentation before the lexer
//! ever sees a byte.

use halc_common::ErrorKind;

/// Normalization failed: the leading whitespace of a line was not a
/// multiple of four spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeError {
    pub kind: ErrorKind,
    /// Byte offset (into the raw input) where the offending line begins.
    pub line_offset: u32,
    /// The leading-space prefix processed so far on that line, for the
    /// diagnostic sink to quote back to the user.
    pub prefix: String,
}

impl std::fmt::Display for NormalizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (prefix {:?} at byte {})",
            self.kind, self.prefix, self.line_offset
        )
    }
}

impl std::error::Error for NormalizeError {}

/// Normalize raw bytes into a canonical UTF-8 buffer.
///
/// Rules (applied in a single forward scan, one line at a time):
/// 1. Every `\r` is stripped unconditionally.
/// 2. At the start of each line, a run of leading spaces that is a multiple
///    of four is folded into `run / 4` hard-tab bytes; any other leading
///    run fails with `INCONSISTENT_FILE_FORMAT`.
/// 3. A line begins after every `\n` and at buffer start.
/// 4. All other bytes pass through unchanged.
pub fn normalize(raw: &[u8]) -> Result<String, NormalizeError> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0usize;
    let mut at_line_start = true;

    while i < raw.len() {
        let b = raw[i];

        if b == b'\r' {
            i += 1;
            continue;
        }

        if at_line_start {
            let line_offset = i as u32;
            let run_start = i;
            while i < raw.len() && raw[i] == b' ' {
                i += 1;
            }
            let spaces = i - run_start;
            if spaces % 4 != 0 {
                return Err(NormalizeError {
                    kind: ErrorKind::InconsistentFileFormat,
                    line_offset,
                    prefix: String::from_utf8_lossy(&raw[run_start..i]).into_owned(),
                });
            }
            for _ in 0..spaces / 4 {
                out.push(b'\t');
            }
            at_line_start = false;
            continue;
        }

        out.push(b);
        if b == b'\n' {
            at_line_start = true;
        }
        i += 1;
    }

    String::from_utf8(out).map_err(|_| NormalizeError {
        kind: ErrorKind::InconsistentFileFormat,
        line_offset: 0,
        prefix: String::new(),
    })
}
