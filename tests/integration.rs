use std::fs;
use std::path::{Path, PathBuf};

use repvar::error::RepvarError;
use repvar::render::RunSummary;
use repvar::report::{log_file_subscriber, TracingReporter};
use repvar::{plan_run, run, RunOptions};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn options(input: &Path, output: &Path) -> RunOptions {
    RunOptions {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        variables: None,
        data: Vec::new(),
        exclude: Vec::new(),
    }
}

fn run_logged(options: RunOptions) -> (repvar::error::Result<RunSummary>, String) {
    let log_dir = tempfile::tempdir().unwrap();
    let log_path = log_dir.path().join("repvar.log");
    let subscriber = log_file_subscriber(&log_path).unwrap();
    let result = tracing::subscriber::with_default(subscriber, || {
        run(options, &mut TracingReporter)
    });
    let log = fs::read_to_string(&log_path).unwrap();
    (result, log)
}

#[test]
fn test_materialize_basic_template() {
    let output = tempfile::tempdir().unwrap();
    let (result, log) = run_logged(options(&fixture_path("basic-template"), output.path()));

    let summary = result.unwrap();
    assert_eq!(
        summary,
        RunSummary {
            found: 3,
            changed: 2,
            unchanged: 1
        }
    );

    // File name rewritten with a transformation
    let manifest = fs::read_to_string(output.path().join("myproject.toml")).unwrap();
    assert!(manifest.contains(r#"name = "my_project""#));
    assert!(manifest.contains(r#"version = "0.3.0""#));
    assert!(manifest.contains(r#"authors = ["Jane Doe"]"#));

    // Directory names pass through verbatim
    let lib_rs = output.path().join("src/${crate_name}/lib.rs");
    let lib_content = fs::read_to_string(&lib_rs).unwrap();
    assert!(lib_content.starts_with("//! MyProject by JANE DOE\n"));
    assert!(lib_content.contains(r#"NAME: &str = "my_project";"#));
    assert!(lib_content.contains(r#"UNKNOWN: &str = "${undefined_variable}";"#));

    // Files without placeholders are copied verbatim
    let license_in = fs::read_to_string(fixture_path("basic-template/docs/LICENSE")).unwrap();
    let license_out = fs::read_to_string(output.path().join("docs/LICENSE")).unwrap();
    assert_eq!(license_in, license_out);

    // The control file is never written
    assert!(!output.path().join("variables.json").exists());

    let warning_line = log
        .lines()
        .find(|line| line.contains("unresolved variable ${undefined_variable}"))
        .unwrap();
    assert!(warning_line.contains("WARN"));
    assert!(log.contains("Summary: found=3 changed=2 unchanged=1"));
}

#[test]
fn test_end_to_end_greeting() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(
        input.path().join("variables.json"),
        r#"{"greeting": "hello", "name": "sam"}"#,
    )
    .unwrap();
    fs::write(input.path().join("${greeting}.txt"), "Hi ${name-uppercase}!").unwrap();

    let (result, _) = run_logged(options(input.path(), output.path()));

    assert_eq!(
        result.unwrap(),
        RunSummary {
            found: 1,
            changed: 1,
            unchanged: 0
        }
    );
    assert_eq!(
        fs::read_to_string(output.path().join("hello.txt")).unwrap(),
        "Hi SAM!"
    );
    let entries: Vec<_> = fs::read_dir(output.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_unresolved_placeholder_file_is_unchanged() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    fs::write(input.path().join("variables.json"), r#"{"a": "b"}"#).unwrap();
    fs::write(input.path().join("${x}.txt"), "${x}").unwrap();

    let (result, _) = run_logged(options(input.path(), output.path()));

    let summary = result.unwrap();
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.changed, 0);
    assert_eq!(
        fs::read_to_string(output.path().join("${x}.txt")).unwrap(),
        "${x}"
    );
}

#[test]
fn test_explicit_variables_file_outside_input() {
    let input = tempfile::tempdir().unwrap();
    let elsewhere = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let vars_path = elsewhere.path().join("config.json");
    fs::write(&vars_path, r#"{"name": "Hello_World"}"#).unwrap();
    fs::write(input.path().join("config.json"), "${name-nocase}").unwrap();
    fs::write(input.path().join("variables.json"), "${name-remove_}").unwrap();

    let mut opts = options(input.path(), output.path());
    opts.variables = Some(vars_path);
    let (result, _) = run_logged(opts);

    // Neither file is a control file: the variables document lives elsewhere.
    assert_eq!(result.unwrap().found, 2);
    assert_eq!(
        fs::read_to_string(output.path().join("config.json")).unwrap(),
        "helloworld"
    );
    assert_eq!(
        fs::read_to_string(output.path().join("variables.json")).unwrap(),
        "HelloWorld"
    );
}

#[test]
fn test_data_overrides_win() {
    let output = tempfile::tempdir().unwrap();
    let mut opts = options(&fixture_path("basic-template"), output.path());
    opts.data = vec![("crate_name".to_string(), "renamed".to_string())];

    let (result, _) = run_logged(opts);
    result.unwrap();

    let manifest = fs::read_to_string(output.path().join("myproject.toml")).unwrap();
    assert!(manifest.contains(r#"name = "renamed""#));
}

#[test]
fn test_exclude_leaves_files_out() {
    let output = tempfile::tempdir().unwrap();
    let mut opts = options(&fixture_path("basic-template"), output.path());
    opts.exclude = vec!["docs/**".to_string()];

    let (result, _) = run_logged(opts);

    assert_eq!(result.unwrap().found, 2);
    assert!(!output.path().join("docs").exists());
}

#[test]
fn test_missing_variables_file_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_root = output.path().join("out");
    fs::write(input.path().join("a.txt"), "${a}").unwrap();

    let (result, _) = run_logged(options(input.path(), &out_root));

    let err = result.err().unwrap();
    assert!(matches!(err, RepvarError::VariablesNotFound { .. }));
    assert!(err.to_string().contains("variables.json"));
    assert!(!out_root.exists());
}

#[test]
fn test_malformed_variables_file_is_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_root = output.path().join("out");
    fs::write(input.path().join("variables.json"), r#"{"a": ["b"]}"#).unwrap();
    fs::write(input.path().join("a.txt"), "${a}").unwrap();

    let (result, _) = run_logged(options(input.path(), &out_root));

    let err = result.err().unwrap();
    assert!(err.is_load_error());
    assert!(!out_root.exists());
}

#[test]
fn test_plan_run_writes_nothing() {
    let output = tempfile::tempdir().unwrap();
    let out_root = output.path().join("planned");

    let plan = plan_run(
        options(&fixture_path("basic-template"), &out_root),
        &mut TracingReporter,
    )
    .unwrap();

    assert_eq!(plan.render_plan.files.len(), 3);
    assert_eq!(plan.output_dir, out_root);
    assert!(!out_root.exists());
}

#[test]
fn test_rerun_is_idempotent() {
    let first = tempfile::tempdir().unwrap();
    let (result, _) = run_logged(options(&fixture_path("basic-template"), first.path()));
    result.unwrap();

    // Feed the output back in with the same variables: nothing left to change.
    fs::copy(
        fixture_path("basic-template/variables.json"),
        first.path().join("variables.json"),
    )
    .unwrap();
    let second = tempfile::tempdir().unwrap();
    let (result, _) = run_logged(options(first.path(), second.path()));

    let summary = result.unwrap();
    assert_eq!(summary.found, 3);
    assert_eq!(summary.changed, 0);
    assert_eq!(summary.unchanged, 3);
}

#[test]
fn test_value_with_path_cannot_escape_output() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let out_root = output.path().join("out");
    fs::write(
        input.path().join("variables.json"),
        r#"{"v": "../escaped.txt"}"#,
    )
    .unwrap();
    fs::write(input.path().join("${v}"), "payload").unwrap();

    let (result, _) = run_logged(options(input.path(), &out_root));

    assert!(matches!(result, Err(RepvarError::InvalidFileName { .. })));
    assert!(!output.path().join("escaped.txt").exists());
    assert!(!out_root.exists());
}
