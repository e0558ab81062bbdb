//! Colored terminal output for pipeline runs
//!
//! Provides consistent, colored CLI output with proper formatting. Write
//! failures on the terminal are ignored; output is never worth failing a
//! release over.

use std::io::Write;
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Output manager for consistent colored terminal output
#[derive(Debug)]
pub struct OutputManager {
    bufwtr: BufferWriter,
    verbose: bool,
    quiet: bool,
}

impl Clone for OutputManager {
    fn clone(&self) -> Self {
        Self::new(self.verbose, self.quiet)
    }
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            bufwtr: BufferWriter::stdout(ColorChoice::Auto),
            verbose,
            quiet,
        }
    }

    fn emit(&self, marker: Option<(&str, ColorSpec)>, message: &str, text_color: Option<ColorSpec>) {
        if self.quiet {
            return;
        }

        let mut buffer = self.bufwtr.buffer();
        if let Some((symbol, spec)) = marker {
            let _ = buffer.set_color(&spec);
            let _ = write!(&mut buffer, "{symbol}");
            let _ = buffer.reset();
            let _ = write!(&mut buffer, " ");
        }
        if let Some(spec) = text_color {
            let _ = buffer.set_color(&spec);
        }
        let _ = writeln!(&mut buffer, "{message}");
        let _ = buffer.reset();
        let _ = self.bufwtr.print(&buffer);
    }

    /// Print an info message (normal output)
    pub fn info(&self, message: &str) {
        self.emit(Some(("ℹ", fg(Color::Cyan))), message, None);
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.emit(Some(("✓", bold(Color::Green))), message, None);
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        self.emit(Some(("⚠", bold(Color::Yellow))), message, Some(fg(Color::Yellow)));
    }

    /// Print an error message (always shown, to stderr)
    pub fn error(&self, message: &str) {
        let bufwtr = BufferWriter::stderr(ColorChoice::Auto);
        let mut buffer = bufwtr.buffer();

        if buffer.set_color(&bold(Color::Red)).is_err()
            || write!(&mut buffer, "✗").is_err()
            || buffer.reset().is_err()
            || buffer.set_color(&fg(Color::Red)).is_err()
            || writeln!(&mut buffer, " {message}").is_err()
            || buffer.reset().is_err()
            || bufwtr.print(&buffer).is_err()
        {
            // Stderr failed - fallback to stdout as last resort
            println!("[STDERR ERROR] ✗ {message}");
        }
    }

    /// Print a verbose/debug message (only in verbose mode)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            self.emit(Some(("→", fg(Color::Blue))), message, None);
        }
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) {
        self.emit(Some(("⋯", fg(Color::Magenta))), message, None);
    }

    /// Print a section header
    pub fn section(&self, title: &str) {
        self.emit(None, "", None);
        self.emit(None, &format!("═══ {title} ═══"), Some(bold(Color::Cyan)));
    }

    /// Print indented text (for sub-items)
    pub fn indent(&self, message: &str) {
        self.emit(None, &format!("    {message}"), None);
    }

    /// Print a plain message (respects quiet mode)
    pub fn println(&self, message: &str) {
        self.emit(None, message, None);
    }
}

fn fg(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    spec
}

fn bold(color: Color) -> ColorSpec {
    let mut spec = fg(color);
    spec.set_bold(true);
    spec
}
