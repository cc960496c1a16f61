//! cc-diag — component I, the typed diagnostic sink.
//!
//! Every front-end stage records problems here instead of bailing out: the
//! parser (component G) recovers locally and keeps going, the stores
//! escalate capacity failures into resource diagnostics, and the VM
//! (component K) can mirror a fault here for a unified end-of-run report.
//! [`ErrorSink`] never itself decides whether to abort a later pipeline
//! stage — the driver reads [`ErrorSink::has_errors`] and [`ErrorSink::counts`]
//! and makes that call, per spec.md §7's propagation policy.

use std::fmt;
use std::io::Write;

/// Diagnostic severity. Ordered so that `Error > Warning > Note` compares
/// the way "more severe" reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Note,
    Warning,
    Error,
}

impl Severity {
    pub const fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The taxonomy from spec.md §7: what part of the system raised this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Syntax,
    Semantic,
    Resource,
    VmRuntime,
    Internal,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Syntax => "syntax",
            Kind::Semantic => "semantic",
            Kind::Resource => "resource",
            Kind::VmRuntime => "vm-runtime",
            Kind::Internal => "internal",
        }
    }
}

/// Pipeline stage tag, distinct from [`Kind`] — a lexer can raise a
/// `Resource` diagnostic just as readily as the parser can.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Lex,
    Parse,
    Sema,
    TacGen,
    Vm,
}

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Sema => "sema",
            Stage::TacGen => "tacgen",
            Stage::Vm => "vm",
        }
    }
}

/// Where in the source a diagnostic applies, derived from a token index by
/// the caller (cc-diag does not know about TSTORE).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub token_index: u32,
    pub file_name: Option<String>,
    pub line: u32,
}

/// One recorded diagnostic. Field set matches spec.md §4.I exactly.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: Kind,
    pub stage: Stage,
    pub code: u32,
    pub location: Option<SourceLocation>,
    pub message: String,
    pub hint: Option<String>,
    pub extra: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: Kind, stage: Stage, code: u32, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            stage,
            code,
            location: None,
            message: message.into(),
            hint: None,
            extra: None,
        }
    }

    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

/// Renders a diagnostic to a writer. A trait rather than a hardcoded format
/// so the driver can swap in a machine-readable renderer later without
/// touching the sink itself (REDESIGN FLAGS: "model the sink as an object
/// ... with a trait/interface for rendering").
pub trait Render {
    fn render(&self, diag: &Diagnostic, out: &mut dyn Write) -> std::io::Result<()>;
}

/// The default human-readable renderer, one line per diagnostic plus an
/// optional hint line.
pub struct TerminalRenderer;

impl Render for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, out: &mut dyn Write) -> std::io::Result<()> {
        match &diag.location {
            Some(loc) => {
                let file = loc.file_name.as_deref().unwrap_or("<input>");
                writeln!(
                    out,
                    "{file}:{line}: {sev}[{stage}::{code:04}]: {msg}",
                    file = file,
                    line = loc.line,
                    sev = diag.severity,
                    stage = diag.stage.name(),
                    code = diag.code,
                    msg = diag.message,
                )?;
            }
            None => {
                writeln!(
                    out,
                    "{sev}[{stage}::{code:04}]: {msg}",
                    sev = diag.severity,
                    stage = diag.stage.name(),
                    code = diag.code,
                    msg = diag.message,
                )?;
            }
        }
        if let Some(hint) = &diag.hint {
            writeln!(out, "  = help: {hint}")?;
        }
        Ok(())
    }
}

/// Caps and output destination for an [`ErrorSink`].
pub struct ErrorConfig {
    pub max_errors: usize,
    pub max_warnings: usize,
    pub output_stream: Box<dyn Write>,
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self {
            max_errors: 64,
            max_warnings: 128,
            output_stream: Box::new(std::io::stderr()),
        }
    }
}

/// Running tallies. These increment unconditionally, even once the
/// corresponding cap has been hit and the diagnostic itself was discarded
/// (spec.md §4.I: "tallies keep incrementing").
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub errors: usize,
    pub warnings: usize,
    pub notes: usize,
}

/// Component I. Owns its caps, its retained diagnostics (bounded by the
/// caps), and the render target.
pub struct ErrorSink {
    max_errors: usize,
    max_warnings: usize,
    output: Box<dyn Write>,
    retained: Vec<Diagnostic>,
    counts: Counts,
}

impl ErrorSink {
    pub fn new(config: ErrorConfig) -> Self {
        Self {
            max_errors: config.max_errors,
            max_warnings: config.max_warnings,
            output: config.output_stream,
            retained: Vec::new(),
            counts: Counts::default(),
        }
    }

    /// Record a diagnostic. Beyond the configured cap for its severity the
    /// diagnostic is dropped, but the tally still advances.
    pub fn report(&mut self, diag: Diagnostic) {
        let (count, cap) = match diag.severity {
            Severity::Error => (&mut self.counts.errors, self.max_errors),
            Severity::Warning => (&mut self.counts.warnings, self.max_warnings),
            Severity::Note => (&mut self.counts.notes, usize::MAX),
        };
        *count += 1;
        let keep = *count <= cap;
        tracing::debug!(
            severity = %diag.severity,
            stage = diag.stage.name(),
            code = diag.code,
            kept = keep,
            "diagnostic recorded",
        );
        if keep {
            self.retained.push(diag);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.counts.errors > 0
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.retained
    }

    /// Render every retained diagnostic and a one-line summary to the
    /// configured output stream.
    pub fn print_summary(&mut self, renderer: &dyn Render) -> std::io::Result<()> {
        for diag in &self.retained {
            renderer.render(diag, &mut self.output)?;
        }
        writeln!(
            self.output,
            "{} error(s), {} warning(s)",
            self.counts.errors, self.counts.warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink(max_errors: usize) -> ErrorSink {
        ErrorSink::new(ErrorConfig {
            max_errors,
            max_warnings: 10,
            output_stream: Box::new(Vec::new()),
        })
    }

    #[test]
    fn counts_keep_incrementing_past_cap() {
        let mut s = sink(1);
        for i in 0..5 {
            s.report(Diagnostic::new(Severity::Error, Kind::Syntax, Stage::Parse, 1, format!("e{i}")));
        }
        assert_eq!(s.counts().errors, 5);
        assert_eq!(s.diagnostics().len(), 1);
        assert!(s.has_errors());
    }

    #[test]
    fn notes_are_uncapped() {
        let mut s = sink(0);
        for _ in 0..100 {
            s.report(Diagnostic::new(Severity::Note, Kind::Internal, Stage::Sema, 0, "n"));
        }
        assert_eq!(s.diagnostics().len(), 100);
        assert!(!s.has_errors());
    }

    #[test]
    fn render_includes_location_and_hint() {
        let mut s = sink(10);
        s.report(
            Diagnostic::new(Severity::Error, Kind::Semantic, Stage::Sema, 42, "undefined identifier y")
                .with_location(SourceLocation { token_index: 7, file_name: Some("a.c".into()), line: 1 })
                .with_hint("did you mean `x`?"),
        );
        s.print_summary(&TerminalRenderer).unwrap();
    }
}
