use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::error::{RepvarError, Result};
use crate::render::rewrite::rewrite;
use crate::report::Reporter;
use crate::variables::VariableMap;

/// Per-run file counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files visited, excluding the control file and excluded paths.
    pub found: usize,
    /// Files whose name or content differs after substitution.
    pub changed: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MaterializeOptions {
    /// File name skipped everywhere in the tree (the variables document).
    pub control_file_name: Option<String>,
    /// Glob patterns matched against paths relative to the input root.
    pub exclude: Vec<String>,
}

/// A file that would be written during materialization.
pub struct PlannedFile {
    pub source: PathBuf,
    /// Path relative to the output root. Only the file name is rewritten.
    pub relative_path: PathBuf,
    pub content: String,
    /// Whether the name or the content changed.
    pub changed: bool,
}

/// The result of planning a run without writing to disk.
pub struct MaterializePlan {
    pub files: Vec<PlannedFile>,
    pub summary: RunSummary,
}

/// Walk the input tree and rewrite every file into memory.
///
/// Any read or decode failure aborts here, before a single output file exists.
pub fn plan_materialize(
    input_root: &Path,
    output_root: &Path,
    variables: &VariableMap,
    options: &MaterializeOptions,
    reporter: &mut dyn Reporter,
) -> Result<MaterializePlan> {
    if !input_root.is_dir() {
        return Err(RepvarError::InputNotFound {
            path: input_root.to_path_buf(),
        });
    }

    let exclude_set = build_glob_set(&options.exclude)?;
    let control = options.control_file_name.as_deref().map(OsStr::new);
    // Output nested inside the input must not be fed back in on a later run.
    let output_canon = output_root.canonicalize().ok();

    let mut files = Vec::new();
    let mut summary = RunSummary::default();

    let walker = WalkDir::new(input_root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !(e.file_type().is_dir() && is_same_dir(e.path(), output_canon.as_deref()))
        });

    for entry in walker {
        let entry = entry.map_err(|e| RepvarError::Walk { source: e })?;
        if !entry.file_type().is_file() {
            continue;
        }

        if control == Some(entry.file_name()) {
            continue;
        }

        let src_path = entry.path();
        let rel_path = src_path
            .strip_prefix(input_root)
            .expect("entry must be under input root");

        if exclude_set.is_match(rel_path) {
            continue;
        }

        summary.found += 1;

        let (file_name, name_changed) = match entry.file_name().to_str() {
            Some(name) => {
                let rewritten = rewrite(name, variables);
                for warning in &rewritten.warnings {
                    reporter.warning(Some(src_path), warning);
                }
                if !is_single_segment(&rewritten.text) {
                    return Err(RepvarError::InvalidFileName {
                        path: src_path.to_path_buf(),
                        name: rewritten.text,
                    });
                }
                (OsString::from(rewritten.text), rewritten.changed)
            }
            // Names that are not UTF-8 cannot hold placeholders.
            None => (entry.file_name().to_os_string(), false),
        };

        let relative_path = match rel_path.parent() {
            Some(parent) => parent.join(&file_name),
            None => PathBuf::from(&file_name),
        };

        let content = read_text(src_path)?;
        let rewritten = rewrite(&content, variables);
        for warning in &rewritten.warnings {
            reporter.warning(Some(src_path), warning);
        }

        let changed = name_changed || rewritten.changed;
        if changed {
            summary.changed += 1;
        } else {
            summary.unchanged += 1;
        }

        files.push(PlannedFile {
            source: src_path.to_path_buf(),
            relative_path,
            content: rewritten.text,
            changed,
        });
    }

    Ok(MaterializePlan { files, summary })
}

/// Write the files from a plan under `output_root`, overwriting existing files.
pub fn execute_plan(
    plan: &MaterializePlan,
    output_root: &Path,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary> {
    std::fs::create_dir_all(output_root).map_err(|e| RepvarError::Io {
        context: format!("creating output directory {}", output_root.display()),
        source: e,
    })?;

    for file in &plan.files {
        let dest_path = output_root.join(&file.relative_path);
        if let Some(parent) = dest_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RepvarError::Io {
                context: format!("creating directory {}", parent.display()),
                source: e,
            })?;
        }
        std::fs::write(&dest_path, &file.content).map_err(|e| RepvarError::Io {
            context: format!("writing {}", dest_path.display()),
            source: e,
        })?;
        reporter.file_processed(&file.source, &dest_path, file.changed);
    }

    Ok(plan.summary)
}

/// Mirror `input_root` into `output_root` with every placeholder resolved.
pub fn materialize(
    input_root: &Path,
    output_root: &Path,
    variables: &VariableMap,
    options: &MaterializeOptions,
    reporter: &mut dyn Reporter,
) -> Result<RunSummary> {
    let plan = plan_materialize(input_root, output_root, variables, options, reporter)?;
    execute_plan(&plan, output_root, reporter)
}

fn read_text(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| RepvarError::Io {
        context: format!("reading {}", path.display()),
        source: e,
    })?;
    String::from_utf8(bytes).map_err(|_| RepvarError::Undecodable {
        path: path.to_path_buf(),
    })
}

/// A rewritten name must stay one plain component directly under its parent.
fn is_single_segment(name: &str) -> bool {
    if name.chars().any(std::path::is_separator) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn is_same_dir(dir: &Path, other: Option<&Path>) -> bool {
    match other {
        Some(other) => dir.canonicalize().map(|c| c == other).unwrap_or(false),
        None => false,
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| RepvarError::GlobPattern {
            pattern: pattern.clone(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| RepvarError::GlobPattern {
        pattern: "<combined>".into(),
        source: e,
    })
}
