//! Job execution and logging initialization.

use crate::cli::Cli;
use anyhow::Result;
use std::fs::File;
use std::path::Path;
use stimulus_codegen::{BackendOptions, GenerationJob, create_backend, is_known_backend};
use stimulus_core::GeneratorConfig;
use stimulus_core::cli::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes logging to standard error.
///
/// `RUST_LOG` selects the level, `info` by default; `verbose` forces
/// `debug`.
///
/// # Errors
///
/// Returns an error if logging initialization fails.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}

fn is_readable(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Checks the arguments before any job runs.
fn precheck(cli: &Cli) -> Option<ExitCode> {
    if cli.languages.len() != cli.outputs.len() {
        eprintln!("Error: number of languages and output files must match");
        return Some(ExitCode::COUNT_MISMATCH);
    }
    if let Some(language) = cli.languages.iter().find(|l| !is_known_backend(l)) {
        eprintln!("Error: unknown language: {language}");
        return Some(ExitCode::UNKNOWN_LANGUAGE);
    }
    let files = [
        ("type", &cli.type_files),
        ("function", &cli.function_files),
        ("input", &cli.inputs),
        ("input", &cli.epilogue_inputs),
    ];
    for (kind, paths) in files {
        if let Some(path) = paths.iter().find(|p| !is_readable(p)) {
            eprintln!("Error: cannot open {kind} file: {}", path.display());
            return Some(ExitCode::UNREADABLE_FILE);
        }
    }
    if let Some(dir) = &cli.docstrings
        && !dir.is_dir()
    {
        eprintln!("Error: cannot open docstring folder: {}", dir.display());
        return Some(ExitCode::UNREADABLE_FILE);
    }
    None
}

fn load_config(cli: &Cli) -> stimulus_core::Result<GeneratorConfig> {
    cli.config
        .as_deref()
        .map_or_else(|| Ok(GeneratorConfig::default()), GeneratorConfig::load)
}

/// Runs every (language, output) job in order.
///
/// Each job loads its own catalog; the first failing job stops the run.
///
/// # Errors
///
/// Returns an error only for failures outside the jobs themselves; job
/// failures are reported and turned into an exit code.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    if let Some(code) = precheck(cli) {
        return Ok(code);
    }

    let config = match load_config(cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return Ok(ExitCode::INVALID_INPUT);
        }
    };
    let options = BackendOptions {
        docstrings: cli.docstrings.clone(),
    };

    let mut diagnostics = 0;
    for (language, output) in cli.languages.iter().zip(&cli.outputs) {
        tracing::info!("Job {language} -> {output}");
        let result = create_backend(language, &options).and_then(|backend| {
            GenerationJob::new(backend, config.clone())
                .function_files(&cli.function_files)
                .type_files(&cli.type_files)
                .inputs(&cli.inputs)
                .epilogue_inputs(&cli.epilogue_inputs)
                .run(output)
        });
        match result {
            Ok(report) => {
                for diagnostic in &report.diagnostics {
                    eprintln!("Warning: {language}: {diagnostic}");
                }
                diagnostics += report.diagnostics.len();
            }
            Err(e) => {
                tracing::error!("{language} generation failed: {e}");
                eprintln!("Error: {e}");
                return Ok(ExitCode::ERROR);
            }
        }
    }

    if diagnostics > 0 && config.fail_on_diagnostics {
        eprintln!("Error: {diagnostics} function(s) could not be generated");
        return Ok(ExitCode::DIAGNOSTICS);
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("stimulus").chain(args.iter().copied()))
    }

    #[test]
    fn test_count_mismatch() {
        let code = run(&cli(&["-l", "RR", "-l", "RC", "-o", "-"])).unwrap();
        assert_eq!(code, ExitCode::COUNT_MISMATCH);
    }

    #[test]
    fn test_unknown_language() {
        let code = run(&cli(&["-l", "Fortran", "-o", "-"])).unwrap();
        assert_eq!(code, ExitCode::UNKNOWN_LANGUAGE);
    }

    #[test]
    fn test_unreadable_function_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.def");
        let code = run(&cli(&["-f", missing.to_str().unwrap(), "-l", "RR", "-o", "-"])).unwrap();
        assert_eq!(code, ExitCode::UNREADABLE_FILE);
    }

    #[test]
    fn test_no_jobs_is_success() {
        assert_eq!(run(&cli(&[])).unwrap(), ExitCode::SUCCESS);
    }
}
