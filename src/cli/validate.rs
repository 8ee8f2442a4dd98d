//! Validate command implementation.
//!
//! Runs the whole compile and assembly pipeline in memory and reports what a
//! build would skip.

use clap::Args;

use super::build::compile_fonts;
use super::SourceArgs;
use crate::compiler::BuildClock;
use crate::error::{DefontError, Result};
use crate::output::{plural, Printer};
use crate::validation::print_diagnostics;

/// Check a glyph table without writing fonts
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: SourceArgs,

    /// Report skipped glyphs as errors and fail
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let config = args.input.load_config()?;
    config.validate()?;

    let table = args.input.load_table(&config, printer)?;
    let build = compile_fonts(&config, &table, &BuildClock::now())?;
    let mut report = build.compilation.report.clone();
    if args.strict {
        report.deny_warnings();
    }

    print_diagnostics(&report, printer);

    if report.has_errors() {
        return Err(DefontError::Build {
            message: format!(
                "{} would be skipped",
                plural(report.affected_keys().count(), "glyph", "glyphs")
            ),
            help: Some("Fix the reported entries or drop --strict".to_string()),
        });
    }

    printer.status(
        "Valid",
        &format!(
            "{} compiled, {} skipped",
            plural(build.compilation.glyphs.len(), "glyph", "glyphs"),
            report.affected_keys().count()
        ),
    );
    Ok(())
}
