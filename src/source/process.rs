//! Glyph tables loaded through the PHP interpreter.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

use super::json::table_from_value;
use super::{GlyphSource, GlyphTable};
use crate::error::{DefontError, Result};

/// Captured interpreter output is cut to this many characters in errors.
const OUTPUT_EXCERPT: usize = 800;

/// Runs `php` to `json_encode` the table variable of a PHP file.
///
/// Interpreter warnings printed around the JSON are tolerated: when stdout
/// does not parse, the first `{` to the last `}` of the output is tried.
#[derive(Debug, Clone)]
pub struct PhpProcessSource {
    path: PathBuf,
    interpreter: String,
}

impl PhpProcessSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let interpreter = if cfg!(windows) { "php.exe" } else { "php" };
        Self {
            path: path.as_ref().to_path_buf(),
            interpreter: interpreter.to_string(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    fn script(&self) -> String {
        let path = serde_json::to_string(&self.path.to_string_lossy()).unwrap_or_default();
        format!(
            "ini_set('display_errors','0');error_reporting(0);require {};\
             echo json_encode($c, JSON_UNESCAPED_UNICODE | JSON_UNESCAPED_SLASHES);",
            path
        )
    }
}

impl GlyphSource for PhpProcessSource {
    fn load(&self) -> Result<GlyphTable> {
        if !self.path.exists() {
            return Err(DefontError::Io {
                path: self.path.clone(),
                message: "glyph table not found".to_string(),
            });
        }

        let output = Command::new(&self.interpreter)
            .args(["-d", "display_errors=0"])
            .args(["-d", "html_errors=0"])
            .args(["-d", "error_reporting=0"])
            .arg("-r")
            .arg(self.script())
            .output()
            .map_err(|e| DefontError::Source {
                message: format!("could not run '{}': {}", self.interpreter, e),
                output: Some("Ensure php is on your PATH, or omit --php".to_string()),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let value = decode_output(&stdout, &stderr).ok_or_else(|| DefontError::Source {
            message: format!(
                "no JSON object in interpreter output (exit status {})",
                output.status
            ),
            output: Some(excerpt(&stdout, &stderr)),
        })?;

        table_from_value(&value)
    }

    fn describe(&self) -> String {
        format!("php interpreter {}", self.path.display())
    }
}

/// Parse stdout, falling back to the `{...}` slice of whichever stream has
/// content.
fn decode_output(stdout: &str, stderr: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(stdout) {
        return Some(value);
    }

    let combined;
    let fallback = if !stdout.trim().is_empty() {
        stdout
    } else if !stderr.trim().is_empty() {
        stderr
    } else {
        combined = format!("{}{}", stdout, stderr);
        &combined
    };

    let start = fallback.find('{')?;
    let end = fallback.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&fallback[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn excerpt(stdout: &str, stderr: &str) -> String {
    let cut = |s: &str| s.chars().take(OUTPUT_EXCERPT).collect::<String>();
    format!(
        "stdout (first {n} chars):\n{}\n\nstderr (first {n} chars):\n{}",
        cut(stdout),
        cut(stderr),
        n = OUTPUT_EXCERPT
    )
}
