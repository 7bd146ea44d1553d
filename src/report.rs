use std::fmt;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use console::style;
use tracing::{info, warn, Level, Subscriber};

use crate::error::{RepvarError, Result};
use crate::render::RunSummary;
use crate::variables::VariableMap;

/// A non-fatal condition met while loading variables or resolving placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A placeholder names a variable that is not defined; it is left as-is.
    UnresolvedVariable { placeholder: String },
    /// A placeholder asks for a transformation that does not exist; the value is used untransformed.
    UnknownTransformation { name: String },
    /// A transformation was requested on a value that is not a string; the placeholder is left as-is.
    NonStringValue { name: String },
    /// A variable whose name no placeholder can reference.
    UnreachableVariable { name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedVariable { placeholder } => {
                write!(f, "unresolved variable {placeholder}, left unchanged")
            }
            Warning::UnknownTransformation { name } => {
                write!(f, "unknown transformation: {name}")
            }
            Warning::NonStringValue { name } => {
                write!(
                    f,
                    "variable '{name}' is not a string and cannot be transformed, left unchanged"
                )
            }
            Warning::UnreachableVariable { name } => {
                write!(
                    f,
                    "variable '{name}' can never be referenced (names must be non-empty and contain no '-')"
                )
            }
        }
    }
}

/// Sink for run diagnostics.
///
/// The materializer reports through this trait so the same traversal can
/// drive console output, a log file, or nothing at all.
pub trait Reporter {
    fn started(&mut self, _input: &Path, _output: &Path, _variables: &VariableMap) {}

    fn file_processed(&mut self, _source: &Path, _dest: &Path, _changed: bool) {}

    fn warning(&mut self, file: Option<&Path>, warning: &Warning);

    fn summary(&mut self, summary: &RunSummary);
}

/// Styled terminal output.
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn started(&mut self, input: &Path, output: &Path, variables: &VariableMap) {
        let names: Vec<&str> = variables.keys().map(String::as_str).collect();
        println!("{}", style(format!("Input Folder: {}", input.display())).magenta());
        println!("{}", style(format!("Output Folder: {}", output.display())).magenta());
        println!(
            "{}",
            style(format!("Variables Loaded: {}", names.join(", "))).magenta()
        );
    }

    fn file_processed(&mut self, source: &Path, dest: &Path, changed: bool) {
        if !self.verbose {
            return;
        }
        let marker = if changed {
            style("changed  ").green()
        } else {
            style("unchanged").dim()
        };
        println!("  {} {} -> {}", marker, source.display(), dest.display());
    }

    fn warning(&mut self, file: Option<&Path>, warning: &Warning) {
        match file {
            Some(path) => eprintln!(
                "{} {}: {}",
                style("warning:").yellow().bold(),
                path.display(),
                style(warning).yellow()
            ),
            None => eprintln!(
                "{} {}",
                style("warning:").yellow().bold(),
                style(warning).yellow()
            ),
        }
    }

    fn summary(&mut self, summary: &RunSummary) {
        println!("{}", style(format!("Files Found: {}", summary.found)).blue());
        println!(
            "{}",
            style(format!("✓ Files Changed: {}", summary.changed)).green()
        );
        println!(
            "{}",
            style(format!("~ Files Unchanged: {}", summary.unchanged)).yellow()
        );
    }
}

/// Emits every event through `tracing`.
///
/// Pair it with [`init_log_file`] to get the timestamped log file behind
/// `--log-file`; without a subscriber the events go nowhere.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn started(&mut self, input: &Path, output: &Path, variables: &VariableMap) {
        let names: Vec<&str> = variables.keys().map(String::as_str).collect();
        info!("Input folder: {}", input.display());
        info!("Output folder: {}", output.display());
        info!("Variables loaded: {}", names.join(", "));
    }

    fn file_processed(&mut self, source: &Path, dest: &Path, changed: bool) {
        let state = if changed { "changed" } else { "unchanged" };
        info!(
            "Processed file: {} -> {} ({state})",
            source.display(),
            dest.display()
        );
    }

    fn warning(&mut self, file: Option<&Path>, warning: &Warning) {
        match file {
            Some(path) => warn!("{}: {warning}", path.display()),
            None => warn!("{warning}"),
        }
    }

    fn summary(&mut self, summary: &RunSummary) {
        info!(
            "Summary: found={} changed={} unchanged={}",
            summary.found, summary.changed, summary.unchanged
        );
    }
}

/// Build a subscriber that writes timestamped, uncolored events to a new log file at `path`.
pub fn log_file_subscriber(path: &Path) -> Result<impl Subscriber + Send + Sync + 'static> {
    let file = File::create(path).map_err(|e| RepvarError::Io {
        context: format!("creating log file {}", path.display()),
        source: e,
    })?;

    Ok(tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .finish())
}

/// Install [`log_file_subscriber`] as the process-wide subscriber.
pub fn init_log_file(path: &Path) -> Result<()> {
    let subscriber = log_file_subscriber(path)?;
    tracing::subscriber::set_global_default(subscriber).map_err(|e| RepvarError::LoggingInit {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
