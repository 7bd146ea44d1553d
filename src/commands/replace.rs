use console::style;
use miette::Result;
use repvar::report::{init_log_file, ConsoleReporter, Reporter, TracingReporter};
use repvar::variables::parse_overrides;
use repvar::RunOptions;

use crate::cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
    let options = RunOptions {
        input: cli.input,
        output: cli.output,
        variables: cli.variables,
        data: parse_overrides(&cli.data)?,
        exclude: cli.exclude,
    };

    let mut reporter: Box<dyn Reporter> = match &cli.log_file {
        Some(path) => {
            init_log_file(path)?;
            Box::new(TracingReporter)
        }
        None => Box::new(ConsoleReporter::new(cli.verbose)),
    };

    if cli.dry_run {
        let plan = repvar::plan_run(options, reporter.as_mut())?;

        println!(
            "\n{} Dry run: files that would be written in {}:",
            style("==>").cyan().bold(),
            style(plan.output_dir.display()).cyan()
        );

        for file in &plan.render_plan.files {
            let action = if file.changed { "rewrite" } else { "copy   " };
            println!(
                "  {} {}",
                style(action).green(),
                file.relative_path.display()
            );
        }

        let summary = plan.render_plan.summary;
        println!(
            "\nSummary: {} found, {} changed, {} unchanged",
            summary.found, summary.changed, summary.unchanged
        );
        println!(
            "\n{} Dry run: no files written.",
            style("\u{2139}").blue().bold()
        );
    } else {
        let summary = repvar::run(options, reporter.as_mut())?;
        if cli.log_file.is_some() {
            println!(
                "{} {} files found, {} changed, {} unchanged",
                style("✓").green().bold(),
                summary.found,
                summary.changed,
                summary.unchanged
            );
        }
    }

    Ok(())
}
