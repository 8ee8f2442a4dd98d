use miette::Diagnostic;
use thiserror::Error;

use crate::container::ContainerError;

/// Main error type for defont operations
#[derive(Error, Diagnostic, Debug)]
pub enum DefontError {
    #[error("IO error: {0}")]
    #[diagnostic(code(defont::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(defont::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Parse error: {message}")]
    #[diagnostic(code(defont::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Glyph source failed: {message}")]
    #[diagnostic(code(defont::source))]
    Source {
        message: String,
        /// Captured interpreter output, trimmed for display.
        #[help]
        output: Option<String>,
    },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(defont::config))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Build error: {message}")]
    #[diagnostic(code(defont::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Geometry invariant violated for '{glyph}': {message}")]
    #[diagnostic(
        code(defont::geometry),
        help("This is a compiler bug; the font was not written")
    )]
    Geometry { glyph: String, message: String },

    #[error("Font assembly failed: {0}")]
    #[diagnostic(code(defont::container))]
    Container(#[from] ContainerError),
}

pub type Result<T> = std::result::Result<T, DefontError>;
