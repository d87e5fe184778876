//! Diagnostic rendering and the suppression sink every compilation threads
//! through instead of a process-wide "quiet mode" flag.

use std::io::Write;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use halc_common::{ErrorKind, Span};

/// A single emitted diagnostic, independent of whether it was ever printed.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
    pub span: Span,
    pub related: Option<(String, Span)>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self { kind, message: message.into(), span, related: None }
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

/// Stable, documentation-linkable code for each error kind.
pub fn error_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::OutOfMemory => "E-RES-001",
        ErrorKind::BadReallocParameters => "E-RES-002",
        ErrorKind::ReallocShrunkWhenNotAllowed => "E-RES-003",
        ErrorKind::UnableToOpenFile => "E-IO-001",
        ErrorKind::FileSeekError => "E-IO-002",
        ErrorKind::InconsistentFileFormat => "E-FMT-001",
        ErrorKind::UnrecognizedToken => "E-LEX-001",
        ErrorKind::TokenizerPointerOverflow => "E-LEX-002",
        ErrorKind::UnexpectedToken => "E-PARSE-001",
        ErrorKind::UnableToParseLine => "E-PARSE-002",
        ErrorKind::UnexpectedReinitialization => "E-STRUCT-001",
        ErrorKind::AssertionFailed => "E-STRUCT-002",
        ErrorKind::TestLeakedMemory => "E-TEST-001",
    }
}

/// Render a diagnostic against `source` into a colorless, byte-for-byte
/// reproducible string (ariadne's own labeled-span layout with a caret
/// under the offending text). Colorless so callers can pipe it to a file
/// without stripping ANSI codes, and so a future snapshot test would not
/// depend on a terminal.
pub fn render(diag: &Diagnostic, filename: &str, source: &str) -> String {
    let config = Config::default().with_color(false);
    let len = source.len();
    let clamp = |s: usize, e: usize| -> (usize, usize) {
        let s = s.min(len);
        let e = e.min(len).max(s);
        if s == e {
            (s, e.saturating_add(1).min(len).max(s))
        } else {
            (s, e)
        }
    };
    let (start, end) = clamp(diag.span.start as usize, diag.span.end as usize);

    let mut builder = Report::build(ReportKind::Error, start..end)
        .with_code(error_code(diag.kind))
        .with_message(&diag.message)
        .with_config(config);

    builder.add_label(
        Label::new(start..end)
            .with_message(diag.message.clone())
            .with_color(Color::Red),
    );
    if let Some((related_msg, related_span)) = &diag.related {
        let (rs, re) = clamp(related_span.start as usize, related_span.end as usize);
        builder.add_label(
            Label::new(rs..re)
                .with_message(related_msg.clone())
                .with_color(Color::Blue),
        );
    }

    let report = builder.finish();
    let mut buf = Vec::new();
    report
        .write(Source::from(source), &mut buf)
        .expect("ariadne report should render to an in-memory buffer");
    let _ = filename; // kept for a future multi-file cache, unused by ariadne today
    String::from_utf8(buf).expect("diagnostic output should be valid UTF-8")
}

/// The channel every compilation stage emits diagnostics through, replacing
/// the global "suppress errors" flag with an explicit value threaded down
/// from `compile()`.
///
/// Suppression affects only whether rendered text reaches the sink's
/// writer -- every diagnostic is still collected in `emitted`, and a fatal
/// error still aborts compilation regardless of suppression.
pub struct Sink<W: Write> {
    writer: W,
    suppressed: bool,
    emitted: Vec<Diagnostic>,
}

impl<W: Write> Sink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, suppressed: false, emitted: Vec::new() }
    }

    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn emitted(&self) -> &[Diagnostic] {
        &self.emitted
    }

    /// Record a diagnostic and, unless suppressed, write its rendered form.
    pub fn emit(&mut self, diag: Diagnostic, filename: &str, source: &str) {
        if !self.suppressed {
            let rendered = render(&diag, filename, source);
            let _ = write!(self.writer, "{rendered}");
        }
        self.emitted.push(diag);
    }
}

impl Sink<std::io::Stderr> {
    /// The default sink: unsuppressed, writing to stderr.
    pub fn stderr() -> Self {
        Self::new(std::io::stderr())
    }
}
