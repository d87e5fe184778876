//! The immutable source buffer every token view and AST span is taken from.

/// An owned, normalized source buffer plus the filename it came from.
///
/// Every [`Span`](crate::Span) produced downstream is a byte range into
/// [`SourceBuffer::text`]. The buffer, the token stream built over it, and
/// the AST arena built over the token stream all share one compilation
/// scope; none of them is meant to outlive the `SourceBuffer` that seeded
/// them, so callers should keep the `SourceBuffer` alive (or bundled inside
/// a `Graph`) for as long as they hold spans into it.
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    filename: String,
    text: String,
}

impl SourceBuffer {
    /// Wrap an already-normalized UTF-8 string with its filename.
    pub fn new(filename: impl Into<String>, text: String) -> Self {
        Self {
            filename: filename.into(),
            text,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_text_and_filename() {
        let buf = SourceBuffer::new("scene.halc", "[hello]\n".to_string());
        assert_eq!(buf.filename(), "scene.halc");
        assert_eq!(buf.text(), "[hello]\n");
        assert_eq!(buf.as_bytes(), b"[hello]\n");
        assert!(!buf.is_empty());
    }

    #[test]
    fn empty_buffer() {
        let buf = SourceBuffer::new("empty.halc", String::new());
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }
}
