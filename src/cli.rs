use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "repvar",
    about = "Replace ${variable} placeholders in all files and file names of a folder",
    long_about = "Replace ${variable} placeholders in all files and file names of a folder.\n\n\
        Placeholders take the form ${name} or ${name-transformation}, where the\n\
        transformation is one of lowercase, uppercase, nocase or remove_.\n\
        The resolved tree is written to the output folder.",
    version
)]
pub struct Cli {
    /// Path to the input folder
    pub input: PathBuf,

    /// Path to the output folder
    pub output: PathBuf,

    /// Path to the JSON file with variables (default: variables.json in the input folder)
    #[arg(short, long, value_name = "PATH")]
    pub variables: Option<PathBuf>,

    /// Set or override variable values (can be repeated: -d key=value)
    #[arg(short, long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Skip files matching a glob relative to the input folder (can be repeated)
    #[arg(short, long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Show the files that would be written without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write diagnostics to a log file instead of the console
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Report every processed file
    #[arg(long)]
    pub verbose: bool,
}
