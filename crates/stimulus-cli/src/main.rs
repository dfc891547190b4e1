//! Stimulus command-line entry point.

use anyhow::Result;
use clap::Parser;
use stimulus_cli::{Cli, init_logging, run};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let exit_code = run(&cli)?;

    std::process::exit(exit_code.as_i32());
}
