//! Stderr reporting for the defont CLI.
//!
//! Every line is `<verb> <message>` with the verb right-aligned in a fixed
//! column, the way cargo reports progress. Stdout stays free for `data -`
//! and `palette` output.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

const VERB_COLUMN: usize = 12;

/// How a line is styled, and whether `--quiet` hides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Progress through the pipeline ("Loaded", "Wrote").
    Progress,
    /// Something was skipped or looks wrong, the run continues.
    Attention,
    /// The run failed.
    Failure,
}

impl Tone {
    fn sgr(self) -> &'static str {
        match self {
            Tone::Progress => "1;32",
            Tone::Attention => "1;33",
            Tone::Failure => "1;31",
        }
    }
}

/// Writes status lines to stderr.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    color: bool,
    quiet: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    /// Colour follows whether stderr is a terminal.
    pub fn new() -> Self {
        Self::plain().color(io::stderr().is_terminal())
    }

    /// No colour, nothing suppressed.
    pub fn plain() -> Self {
        Self {
            color: false,
            quiet: false,
        }
    }

    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Hide progress lines. Warnings and failures still print.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn status(&self, verb: &str, message: &str) {
        self.emit(Tone::Progress, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.emit(Tone::Attention, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.emit(Tone::Failure, verb, message);
    }

    /// Print a detail line (a diagnostic, a help hint) unless it is progress
    /// and the printer is quiet.
    pub fn detail(&self, tone: Tone, text: &str) {
        if self.shows(tone) {
            let _ = writeln!(io::stderr().lock(), "{text}");
        }
    }

    pub fn emit(&self, tone: Tone, verb: &str, message: &str) {
        if self.shows(tone) {
            let _ = writeln!(io::stderr().lock(), "{}", self.line(tone, verb, message));
        }
    }

    pub fn shows(&self, tone: Tone) -> bool {
        !(self.quiet && tone == Tone::Progress)
    }

    /// The text of a status line, without the trailing newline.
    pub fn line(&self, tone: Tone, verb: &str, message: &str) -> String {
        let verb = format!("{verb:>VERB_COLUMN$}");
        format!("{} {message}", self.paint(tone.sgr(), &verb))
    }

    /// Bold label in the tone's colour.
    pub fn label(&self, tone: Tone, text: &str) -> String {
        self.paint(tone.sgr(), text)
    }

    /// Paths and names.
    pub fn accent(&self, text: &str) -> String {
        self.paint("36", text)
    }

    /// Secondary detail such as sizes and hints.
    pub fn muted(&self, text: &str) -> String {
        self.paint("2", text)
    }

    fn paint(&self, sgr: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{sgr}m{text}\x1b[0m")
        } else {
            text.to_owned()
        }
    }
}

/// `1 glyph`, `3 glyphs`.
pub fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{n} {}", if n == 1 { one } else { many })
}

/// File sizes in binary units: `812 B`, `14.2 KiB`.
pub fn byte_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let size = bytes as f64;
    match bytes {
        0..=1023 => format!("{bytes} B"),
        1024..=1_048_575 => format!("{:.1} KiB", size / KIB),
        _ => format!("{:.1} MiB", size / (KIB * KIB)),
    }
}

/// `path` relative to the working directory when it lies below it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(rel) if rel.as_os_str().is_empty() => ".".to_owned(),
        Some(rel) => rel.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_right_aligns_verb() {
        let printer = Printer::plain();
        assert_eq!(
            printer.line(Tone::Progress, "Wrote", "out/defont.ttf"),
            "       Wrote out/defont.ttf"
        );
        assert_eq!(
            printer.line(Tone::Failure, "Failed", "1 error"),
            "      Failed 1 error"
        );
    }

    #[test]
    fn test_line_colour() {
        let printer = Printer::plain().color(true);
        assert_eq!(
            printer.line(Tone::Attention, "Checked", "1 warning"),
            "\x1b[1;33m     Checked\x1b[0m 1 warning"
        );
        assert_eq!(printer.accent("chars.php"), "\x1b[36mchars.php\x1b[0m");
        assert_eq!(Printer::plain().muted("4.0 KiB"), "4.0 KiB");
    }

    #[test]
    fn test_quiet_hides_progress_only() {
        let printer = Printer::plain().quiet(true);
        assert!(!printer.shows(Tone::Progress));
        assert!(printer.shows(Tone::Attention));
        assert!(printer.shows(Tone::Failure));
        assert!(Printer::plain().shows(Tone::Progress));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "glyph", "glyphs"), "1 glyph");
        assert_eq!(plural(0, "glyph", "glyphs"), "0 glyphs");
        assert_eq!(plural(5, "layer", "layers"), "5 layers");
    }

    #[test]
    fn test_byte_size() {
        assert_eq!(byte_size(812), "812 B");
        assert_eq!(byte_size(1023), "1023 B");
        assert_eq!(byte_size(2048), "2.0 KiB");
        assert_eq!(byte_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_display_path() {
        let outside = Path::new("/nonexistent/path/to/file");
        assert_eq!(display_path(outside), "/nonexistent/path/to/file");

        let cwd = std::env::current_dir().unwrap();
        assert_eq!(display_path(&cwd), ".");
        let nested = Path::new("out").join("a.ttf");
        assert_eq!(display_path(&cwd.join(&nested)), nested.display().to_string());
    }
}
