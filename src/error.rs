#![allow(unused_assignments)]

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RepvarError {
    #[error("Variables file not found: {path}")]
    #[diagnostic(help(
        "Pass --variables <PATH> or place a variables.json in the input folder"
    ))]
    VariablesNotFound { path: PathBuf },

    #[error("Failed to read variables file {path}")]
    VariablesRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse variables file {path}")]
    #[diagnostic(help("Check the JSON syntax in your variables file"))]
    VariablesParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid variables file {path}: {reason}")]
    #[diagnostic(help(
        "The variables file must be a flat JSON object of names to string values"
    ))]
    VariablesShape { path: PathBuf, reason: String },

    #[error("Invalid variable override: {input}")]
    #[diagnostic(help("Overrides take the form -d key=value"))]
    InvalidOverride { input: String },

    #[error("Input folder not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("File is not valid UTF-8 text: {path}")]
    #[diagnostic(help(
        "Binary files are not supported; exclude them with --exclude <GLOB>"
    ))]
    Undecodable { path: PathBuf },

    #[error("File name {name:?} rewritten from {path} is not a single path segment")]
    #[diagnostic(help(
        "Values used in file names must be non-empty and contain no path separators or '..'"
    ))]
    InvalidFileName { path: PathBuf, name: String },

    #[error("Failed to set up logging to {path}: {reason}")]
    LoggingInit { path: PathBuf, reason: String },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk input folder")]
    Walk {
        #[source]
        source: walkdir::Error,
    },

    #[error("Glob pattern error: {pattern}")]
    GlobPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

impl RepvarError {
    /// Whether this error was raised while loading variables, before any file was touched.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            RepvarError::VariablesNotFound { .. }
                | RepvarError::VariablesRead { .. }
                | RepvarError::VariablesParse { .. }
                | RepvarError::VariablesShape { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RepvarError>;
