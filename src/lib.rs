pub mod error;
pub mod render;
pub mod report;
pub mod variables;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::render::{
    execute_plan, plan_materialize, MaterializeOptions, MaterializePlan, RunSummary,
};
use crate::report::Reporter;
use crate::variables::{apply_overrides, load_variables, DEFAULT_VARIABLES_FILE};

/// Options for a single materialization run.
pub struct RunOptions {
    /// Template tree to read.
    pub input: PathBuf,
    /// Where the resolved tree is written.
    pub output: PathBuf,
    /// Variables document. Defaults to `variables.json` inside `input`.
    pub variables: Option<PathBuf>,
    /// `key=value` overrides applied on top of the variables document.
    pub data: Vec<(String, String)>,
    /// Glob patterns (relative to `input`) to leave out of the output.
    pub exclude: Vec<String>,
}

/// Everything needed to write a run that has been planned but not yet executed.
pub struct FullRunPlan {
    pub render_plan: MaterializePlan,
    pub output_dir: PathBuf,
}

/// Load variables and rewrite the whole input tree in memory.
///
/// A variables load failure is returned before the input tree is read.
pub fn plan_run(options: RunOptions, reporter: &mut dyn Reporter) -> Result<FullRunPlan> {
    let variables_path = options
        .variables
        .clone()
        .unwrap_or_else(|| options.input.join(DEFAULT_VARIABLES_FILE));

    let loaded = load_variables(&variables_path)?;
    for warning in &loaded.warnings {
        reporter.warning(Some(&variables_path), warning);
    }

    let mut variables = loaded.variables;
    apply_overrides(&mut variables, options.data);

    reporter.started(&options.input, &options.output, &variables);

    let materialize_options = MaterializeOptions {
        control_file_name: control_file_name(&variables_path, &options.input),
        exclude: options.exclude,
    };

    let render_plan = plan_materialize(
        &options.input,
        &options.output,
        &variables,
        &materialize_options,
        reporter,
    )?;

    Ok(FullRunPlan {
        render_plan,
        output_dir: options.output,
    })
}

/// Write a planned run to disk and report its summary.
pub fn execute_run(plan: FullRunPlan, reporter: &mut dyn Reporter) -> Result<RunSummary> {
    let summary = execute_plan(&plan.render_plan, &plan.output_dir, reporter)?;
    reporter.summary(&summary);
    Ok(summary)
}

/// Materialize `options.input` into `options.output`.
pub fn run(options: RunOptions, reporter: &mut dyn Reporter) -> Result<RunSummary> {
    let plan = plan_run(options, reporter)?;
    execute_run(plan, reporter)
}

/// The variables document is only excluded from the tree when it lives inside it.
fn control_file_name(variables_path: &Path, input: &Path) -> Option<String> {
    let parent = variables_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let variables_dir = parent.canonicalize().ok()?;
    let input = input.canonicalize().ok()?;
    if !variables_dir.starts_with(&input) {
        return None;
    }
    variables_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
}
