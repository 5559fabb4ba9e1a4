//! Terminal output for release commands.
//!
//! Guidance for the next manual step goes to stdout. Failures, warnings,
//! recovery suggestions and cleanup diagnostics go to stderr, so a script can
//! capture the guidance on its own.

use std::io::Write;
use termcolor::{Buffer, BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

const INDENT: &str = "    ";

/// Leading mark of a message
#[derive(Debug, Clone, Copy)]
enum Mark {
    Success,
    Info,
    Warning,
    Failure,
}

impl Mark {
    fn glyph(self) -> &'static str {
        match self {
            Mark::Success => "✓",
            Mark::Info => "ℹ",
            Mark::Warning => "⚠",
            Mark::Failure => "✗",
        }
    }

    fn color(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Mark::Success => spec.set_fg(Some(Color::Green)).set_bold(true),
            Mark::Info => spec.set_fg(Some(Color::Cyan)),
            Mark::Warning => spec.set_fg(Some(Color::Yellow)).set_bold(true),
            Mark::Failure => spec.set_fg(Some(Color::Red)).set_bold(true),
        };
        spec
    }
}

/// Colored writer split between guidance (stdout) and diagnostics (stderr)
#[derive(Debug)]
pub struct OutputManager {
    guidance: BufferWriter,
    diagnostics: BufferWriter,
}

impl Default for OutputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputManager {
    /// Create an output manager that colors only when attached to a terminal
    pub fn new() -> Self {
        Self {
            guidance: BufferWriter::stdout(ColorChoice::Auto),
            diagnostics: BufferWriter::stderr(ColorChoice::Auto),
        }
    }

    /// Completed step, on stdout
    pub fn success(&self, message: &str) {
        emit(&self.guidance, Some(Mark::Success), message);
    }

    /// Heading for the next manual step, on stdout
    pub fn info(&self, message: &str) {
        emit(&self.guidance, Some(Mark::Info), message);
    }

    /// Indented detail or command under the last stdout heading
    pub fn detail(&self, message: &str) {
        emit(&self.guidance, None, &format!("{INDENT}{message}"));
    }

    /// Plain stdout line
    pub fn line(&self, message: &str) {
        emit(&self.guidance, None, message);
    }

    /// Problem that did not stop the command, on stderr
    pub fn warn(&self, message: &str) {
        emit(&self.diagnostics, Some(Mark::Warning), message);
    }

    /// Failure, on stderr
    pub fn error(&self, message: &str) {
        emit(&self.diagnostics, Some(Mark::Failure), message);
    }

    /// Indented detail under the last stderr message
    pub fn diagnostic(&self, message: &str) {
        emit(&self.diagnostics, None, &format!("{INDENT}{message}"));
    }

    /// Recovery suggestions for a failed command, on stderr
    pub fn suggestions(&self, suggestions: &[String]) {
        if suggestions.is_empty() {
            return;
        }
        emit(&self.diagnostics, None, "\n💡 Recovery suggestions:");
        for suggestion in suggestions {
            emit(&self.diagnostics, None, &format!("  • {suggestion}"));
        }
    }
}

fn emit(writer: &BufferWriter, mark: Option<Mark>, message: &str) {
    let mut buffer = writer.buffer();
    if write_marked(&mut buffer, mark, message).is_err() || writer.print(&buffer).is_err() {
        // Closed pipe or similar; nothing left to report to.
        log::debug!("dropped output line: {}", message);
    }
}

fn write_marked(buffer: &mut Buffer, mark: Option<Mark>, message: &str) -> std::io::Result<()> {
    if let Some(mark) = mark {
        buffer.set_color(&mark.color())?;
        write!(buffer, "{}", mark.glyph())?;
        buffer.reset()?;
        write!(buffer, " ")?;
    }
    writeln!(buffer, "{}", message)
}
