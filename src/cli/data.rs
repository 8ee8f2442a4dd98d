//! Data command implementation.
//!
//! Writes the glyph table as JSON, or as a Python or JavaScript module, for
//! other tools.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use super::SourceArgs;
use crate::compiler::BuildClock;
use crate::error::Result;
use crate::export::{export_table, render_data, write_data, DataFormat};
use crate::output::{display_path, plural, Printer};
use crate::source::open_source;

/// Export a glyph table as JSON, Python or JavaScript data
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    #[command(flatten)]
    pub input: SourceArgs,

    /// Output file; `-` or nothing writes to stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// File layout; defaults to the output extension, then JSON
    #[arg(long, value_enum)]
    pub format: Option<DataFormat>,
}

pub fn run(args: DataArgs, printer: &Printer) -> Result<()> {
    let config = args.input.load_config()?;
    config.validate()?;

    let table = args.input.load_table(&config, printer)?;
    let label = open_source(&config.source, args.input.php).describe();
    let data = export_table(&table, config.metrics.rows, &label, &BuildClock::now());

    let output = args.output.as_deref().filter(|p| p.as_os_str() != "-");
    let format = args
        .format
        .or_else(|| output.and_then(DataFormat::from_path))
        .unwrap_or_default();

    match output {
        Some(path) => {
            write_data(&data, path, format)?;
            printer.status(
                "Exported",
                &format!(
                    "{} to {}",
                    plural(data.meta.glyph_count, "glyph", "glyphs"),
                    display_path(path)
                ),
            );
        }
        None => {
            let text = render_data(&data, format)?;
            std::io::stdout().lock().write_all(text.as_bytes())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_data_writes_export() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("chars.php");
        fs::write(&source, "<?php\n$c[0x41] = [1,1,1,1,1,1,1,1,1];\n").unwrap();
        let output = dir.path().join("glyphs.json");

        let args = DataArgs {
            input: SourceArgs {
                source: Some(source),
                ..Default::default()
            },
            output: Some(output.clone()),
            format: None,
        };
        run(args, &Printer::new()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(value["meta"]["glyph_count"], 1);
        assert_eq!(value["glyphs"]["65"]["width"], 1);
        assert_eq!(value["glyphs"]["65"]["height"], 9);
        assert!(value["source"].as_str().unwrap().starts_with("php"));
    }

    #[test]
    fn test_data_format_follows_extension() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("chars.php");
        fs::write(&source, "<?php\n$c[0x41] = [1,1,1,1,1,1,1,1,1];\n").unwrap();
        let output = dir.path().join("data").join("chars.js");

        let args = DataArgs {
            input: SourceArgs {
                source: Some(source),
                ..Default::default()
            },
            output: Some(output.clone()),
            format: None,
        };
        run(args, &Printer::new()).unwrap();

        let module = fs::read_to_string(&output).unwrap();
        assert!(module.contains("export const charsData = {"));
        assert!(module.ends_with("export default charsData;\n"));
    }

    #[test]
    fn test_data_format_flag_wins() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("chars.php");
        fs::write(&source, "<?php\n$c[0x41] = [1,1,1,1,1,1,1,1,1];\n").unwrap();
        let output = dir.path().join("chars.txt");

        let args = DataArgs {
            input: SourceArgs {
                source: Some(source),
                ..Default::default()
            },
            output: Some(output.clone()),
            format: Some(DataFormat::Python),
        };
        run(args, &Printer::new()).unwrap();

        let module = fs::read_to_string(&output).unwrap();
        assert!(module.contains("CHARS_DATA = {"));
    }
}
