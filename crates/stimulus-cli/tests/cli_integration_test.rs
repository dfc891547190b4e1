//! Integration tests for the `stimulus` job runner.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use stimulus_cli::{Cli, run};
use stimulus_core::cli::ExitCode;
use tempfile::TempDir;

const FUNCTIONS: &str = "\
igraph_vcount:
    PARAMS: GRAPH graph
    RETURN: INTEGER

igraph_broken:
    PARAMS: GRAPH graph, OUT MATRIX res
";

const TYPES: &str = "\
GRAPH:
    CTYPE: igraph_t
INTEGER:
    CTYPE: igraph_integer_t
ERROR:
    CTYPE: igraph_error_t
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("functions.def"), FUNCTIONS).unwrap();
        fs::write(dir.path().join("types.def"), TYPES).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, extra: &[&str]) -> ExitCode {
        let functions = self.path("functions.def");
        let types = self.path("types.def");
        let mut args = vec![
            "stimulus".to_string(),
            "-f".to_string(),
            arg(&functions),
            "-t".to_string(),
            arg(&types),
        ];
        args.extend(extra.iter().map(ToString::to_string));
        run(&Cli::parse_from(args)).unwrap()
    }
}

fn arg(path: &Path) -> String {
    path.display().to_string()
}

#[test]
fn test_multiple_jobs_write_their_outputs() {
    let fx = Fixture::new();
    let namespace = fx.path("NAMESPACE");
    let types = fx.path("types.txt");

    let code = fx.run(&[
        "-l", "RNamespace", "-o", &arg(&namespace),
        "-l", "DebugListTypes", "-o", &arg(&types),
    ]);

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        fs::read_to_string(&namespace).unwrap(),
        "export(graph.vcount)\nexport(graph.broken)\n"
    );
    assert_eq!(
        fs::read_to_string(&types).unwrap(),
        "ERROR 1\nGRAPH 2\nINTEGER 1\nMATRIX 1\n"
    );
}

#[test]
fn test_link_list_and_ctypes_jobs() {
    let fx = Fixture::new();
    let links = fx.path("links.txt");
    let ctypes = fx.path("_lib.py");

    let code = fx.run(&[
        "-l", "ShellLn", "-o", &arg(&links),
        "-l", "PythonCTypes", "-o", &arg(&ctypes),
    ]);

    assert_eq!(code, ExitCode::SUCCESS);
    assert_eq!(
        fs::read_to_string(&links).unwrap(),
        "igraph_vcount\nigraph_broken\n"
    );
    let text = fs::read_to_string(&ctypes).unwrap();
    assert!(text.contains("igraph_vcount.restype = igraph_integer_t\nigraph_vcount.argtypes = [igraph_t]\n"));
    assert!(text.contains("# Unknown type 'MATRIX' in function 'igraph_broken'"));
}

#[test]
fn test_diagnostics_are_warnings_by_default() {
    let fx = Fixture::new();
    let out = fx.path("rinterface.c");
    let code = fx.run(&["-l", "RC", "-o", &arg(&out)]);

    assert_eq!(code, ExitCode::SUCCESS);
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("SEXP R_igraph_vcount(SEXP graph)"));
    assert!(text.contains("/* ERROR: "));
}

#[test]
fn test_fail_on_diagnostics() {
    let fx = Fixture::new();
    let config = fx.path("stimulus.toml");
    fs::write(&config, "fail_on_diagnostics = true\n").unwrap();
    let out = fx.path("rinterface.c");

    let code = fx.run(&["--config", &arg(&config), "-l", "RC", "-o", &arg(&out)]);
    assert_eq!(code, ExitCode::DIAGNOSTICS);
    assert!(out.exists());
}

#[test]
fn test_invalid_config_is_a_usage_error() {
    let fx = Fixture::new();
    let config = fx.path("stimulus.toml");
    fs::write(&config, "no_such_option = 1\n").unwrap();

    let code = fx.run(&["--config", &arg(&config), "-l", "RR", "-o", "-"]);
    assert_eq!(code, ExitCode::INVALID_INPUT);
}

#[test]
fn test_structural_error_fails_the_run() {
    let fx = Fixture::new();
    let bad = fx.path("bad.def");
    fs::write(&bad, "igraph_vcount:\n    DEPS: graph ON nothing\n").unwrap();
    let out = fx.path("out.R");

    let code = fx.run(&["-f", &arg(&bad), "-l", "RR", "-o", &arg(&out)]);
    assert_eq!(code, ExitCode::ERROR);
    assert!(!out.exists());
}

#[test]
fn test_unreadable_input_file() {
    let fx = Fixture::new();
    let missing = fx.path("missing.in");
    let code = fx.run(&["-i", &arg(&missing), "-l", "RR", "-o", "-"]);
    assert_eq!(code, ExitCode::UNREADABLE_FILE);
}
