//! Integration tests for loading specification files from disk.

use std::fs;
use stimulus_parser::{AttrValue, SourceFormat, deep_merge, load_file};
use tempfile::TempDir;

const FUNCTIONS_DEF: &str = "\
# Basic query functions

igraph_vcount:
    PARAMS: GRAPH graph
    RETURN: INTEGER

igraph_degree:
    PARAMS: GRAPH graph, OUT VECTOR_INT res, VS vids=ALL, \\
            NEIMODE mode=ALL, BOOLEAN loops
    DEPS: vids ON graph, mode ON graph
    IGNORE: Shell
";

const FUNCTIONS_YAML: &str = "\
igraph_degree:
  IGNORE: [RR]
  FLAGS: internal
igraph_ecount:
  PARAMS: GRAPH graph
  RETURN: INTEGER
";

#[test]
fn test_load_legacy_functions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("functions.def");
    fs::write(&path, FUNCTIONS_DEF).unwrap();

    let tree = load_file(&path).unwrap();
    let names: Vec<_> = tree.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["igraph_vcount", "igraph_degree"]);

    let degree = tree["igraph_degree"].as_map().unwrap();
    assert_eq!(
        degree["PARAMS"],
        AttrValue::text(
            "GRAPH graph, OUT VECTOR_INT res, VS vids=ALL, \n  NEIMODE mode=ALL, BOOLEAN loops"
        )
    );
    assert_eq!(degree["IGNORE"], AttrValue::text("Shell"));
}

#[test]
fn test_merge_legacy_and_yaml_sources() {
    let dir = TempDir::new().unwrap();
    let legacy = dir.path().join("functions.def");
    let yaml = dir.path().join("functions-extra.yml");
    fs::write(&legacy, FUNCTIONS_DEF).unwrap();
    fs::write(&yaml, FUNCTIONS_YAML).unwrap();

    let mut tree = load_file(&legacy).unwrap();
    deep_merge(&mut tree, &load_file(&yaml).unwrap());

    let names: Vec<_> = tree.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["igraph_vcount", "igraph_degree", "igraph_ecount"]);

    let degree = tree["igraph_degree"].as_map().unwrap();
    assert_eq!(degree["IGNORE"], AttrValue::List(vec!["RR".to_string()]));
    assert_eq!(degree["FLAGS"], AttrValue::text("internal"));
    assert!(degree.contains_key("DEPS"));
}

#[test]
fn test_malformed_file_reports_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.def");
    fs::write(&path, "f:\n    PARAMS: INT a\n  RETURN: INT\n").unwrap();

    let err = load_file(&path).unwrap_err();
    assert!(err.is_structural());
    assert_eq!(err.to_string(), "Bad indentation in line 3");
}

#[test]
fn test_write_then_load() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("functions.def");
    fs::write(&source, FUNCTIONS_DEF).unwrap();
    let tree = load_file(&source).unwrap();

    for (file, format) in [("out.def", SourceFormat::Legacy), ("out.yaml", SourceFormat::Yaml)] {
        let path = dir.path().join(file);
        fs::write(&path, format.write(&tree).unwrap()).unwrap();
        assert_eq!(load_file(&path).unwrap(), tree, "{format} output differs");
    }
}
