//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;
use stimulus_core::cli::OutputTarget;

/// Stimulus - generates language bindings from function and type
/// specifications.
///
/// Every `-l` language is paired with the `-o` output at the same position;
/// each pair is generated from all function and type files, merged in the
/// order given.
///
/// # Examples
///
/// ```bash
/// stimulus -f functions.yaml -t types-RR.yaml -l RR -o R/aaa-auto.R \
///     -i auto.R.in
///
/// stimulus -f functions.yaml -l RNamespace -o - -l DebugListTypes -o types.txt
/// ```
#[derive(Parser, Debug)]
#[command(name = "stimulus")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Function specification file (repeatable)
    #[arg(short = 'f', long = "functions", value_name = "FILE")]
    pub function_files: Vec<PathBuf>,

    /// Type specification file (repeatable)
    #[arg(short = 't', long = "types", value_name = "FILE")]
    pub type_files: Vec<PathBuf>,

    /// Target language (repeatable, paired with -o)
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    pub languages: Vec<String>,

    /// Output file, `-` for standard output (repeatable, paired with -l)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub outputs: Vec<OutputTarget>,

    /// Input file placed before the generated functions (repeatable)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Input file placed after the generated functions (repeatable)
    #[arg(short = 'e', long = "epilogue", value_name = "FILE")]
    pub epilogue_inputs: Vec<PathBuf>,

    /// Generator configuration (TOML)
    #[arg(long, value_name = "FILE", env = "STIMULUS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Folder of `<function>.txt` documentation files for the R wrappers
    #[arg(long, value_name = "DIR")]
    pub docstrings: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long)]
    pub verbose: bool,
}
