//! Diagnostics for glyph tables.
//!
//! Source defects (malformed pixel grids, colliding names) never abort a
//! build: the affected entry is skipped and a warning is recorded here. Used
//! by both `defont validate` and `defont build`.

mod diagnostic;

pub use diagnostic::{Diagnostic, Severity, ValidationResult};

use crate::output::{plural, Printer, Tone};

impl From<Severity> for Tone {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Warning => Tone::Attention,
            Severity::Error => Tone::Failure,
        }
    }
}

/// Print each diagnostic with its help line, then the summary.
pub fn print_diagnostics(result: &ValidationResult, printer: &Printer) {
    for d in result.iter() {
        let tone = Tone::from(d.severity);
        let label = printer.label(tone, &d.severity.to_string());
        printer.detail(tone, &format!("{label}[{}]: {}", d.code, d.message));
        if let Some(help) = &d.help {
            printer.detail(tone, &format!("  {} {help}", printer.muted("help:")));
        }
    }

    if let Some((tone, verb, message)) = summary(result) {
        printer.emit(tone, verb, &message);
    }
}

/// The closing status line, or `None` when there is nothing to report.
pub fn summary(result: &ValidationResult) -> Option<(Tone, &'static str, String)> {
    let errors = result.error_count();
    let warnings = result.warning_count();
    if errors > 0 {
        let message = format!(
            "{}, {}",
            plural(errors, "error", "errors"),
            plural(warnings, "warning", "warnings")
        );
        Some((Tone::Failure, "Failed", message))
    } else if warnings > 0 {
        Some((Tone::Attention, "Checked", plural(warnings, "warning", "warnings")))
    } else {
        None
    }
}
