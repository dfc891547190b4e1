//! End-to-end tests of the generation engine and the bundled backends.

use std::fs;
use stimulus_codegen::{
    Backend, BackendOptions, BlockRegistry, Composition, FunctionContext, GenerationJob, InputFile,
    Inputs, ResultShape, Session, create_backend, generate, render_functions,
};
use stimulus_core::cli::OutputTarget;
use stimulus_core::{BlockName, Error, GeneratorConfig, Result};
use stimulus_model::Catalog;
use stimulus_parser::parse_str;
use tempfile::TempDir;

const TYPES_RC: &str = "\
INT:
    CTYPE: igraph_integer_t
DOUBLE:
    CTYPE: igraph_real_t
    OUTCONV:
        OUT: PROTECT(%I%=NEW_NUMERIC(1)); REAL(%I%)[0]=%C%;
ERROR:
    CTYPE: igraph_error_t
";

fn session(functions: &str, types: &str, backend: &str) -> Session {
    let mut catalog = Catalog::new();
    catalog.load_functions(&parse_str(functions).unwrap()).unwrap();
    catalog.load_types(&parse_str(types).unwrap()).unwrap();
    Session::new(catalog, backend, GeneratorConfig::default())
}

fn render(backend: &str, functions: &str, types: &str) -> (String, Session) {
    let mut s = session(functions, types, backend);
    let mut backend = create_backend(backend, &BackendOptions::default()).unwrap();
    let text = generate(backend.as_mut(), &mut s, &Inputs::default()).unwrap();
    (text, s)
}

#[test]
fn test_single_output_is_the_result() {
    let functions = "f:\n    PARAMS: IN INT a, OUT DOUBLE b\n";
    let s = session(functions, TYPES_RC, "RC");
    let ctx = FunctionContext::resolve(s.catalog(), "f").unwrap();
    assert!(matches!(ctx.shape(), ResultShape::Single(p) if p.name() == "b"));

    let (text, _) = render("RC", functions, TYPES_RC);
    assert!(text.contains("SEXP R_f(SEXP a) {"));
    assert!(text.contains("  SEXP b;\n  SEXP result;\n"));
    assert!(text.contains("  f(c_a, c_b);\n"));
    assert!(text.contains("  PROTECT(b=NEW_NUMERIC(1)); REAL(b)[0]=c_b;\n  result=b;\n"));
    assert!(!text.contains("NEW_LIST"));
}

#[test]
fn test_two_outputs_form_a_named_aggregate() {
    let functions = "f:\n    PARAMS: IN INT a, OUT DOUBLE b, OUT INT c\n";
    let s = session(functions, TYPES_RC, "RC");
    let ctx = FunctionContext::resolve(s.catalog(), "f").unwrap();
    assert_eq!(ctx.shape().keys(), vec!["b", "c"]);

    let (text, _) = render("RC", functions, TYPES_RC);
    assert!(text.contains("  SEXP result, names;\n"));
    assert!(text.contains("  PROTECT(result=NEW_LIST(2));\n  PROTECT(names=NEW_CHARACTER(2));\n"));
    assert!(text.contains("  SET_VECTOR_ELT(result, 0, b);\n  SET_VECTOR_ELT(result, 1, c);\n"));
    assert!(text.contains(
        "  SET_STRING_ELT(names, 0, CREATE_STRING_VECTOR(\"b\"));\n  SET_STRING_ELT(names, 1, CREATE_STRING_VECTOR(\"c\"));\n"
    ));
    assert!(text.contains("  SET_NAMES(result, names);\n  UNPROTECT(3);\n"));
}

#[test]
fn test_unresolved_dependency_is_structural() {
    let mut catalog = Catalog::new();
    catalog
        .load_functions(&parse_str("f:\n    PARAMS: INT a\n    DEPS: a ON b\n").unwrap())
        .unwrap();
    let err = catalog.validate().unwrap_err();
    assert!(err.is_structural());
    assert!(matches!(
        err,
        Error::UnresolvedDependency { ref function, ref parameter, ref dependency }
            if function == "f" && parameter == "a" && dependency == "b"
    ));
}

#[test]
fn test_per_function_problems_become_comments() {
    let (text, s) = render(
        "RC",
        "igraph_ok:\n    PARAMS: INT a\nigraph_bad:\n    PARAMS: MATRIX m\n",
        TYPES_RC,
    );
    assert!(text.contains("SEXP R_igraph_ok(SEXP a)"));
    assert!(text.contains("/* ERROR: "));
    assert!(!text.contains("R_igraph_bad"));
    assert_eq!(s.diagnostics().len(), 1);
    assert_eq!(s.diagnostics()[0].function, "igraph_bad");
}

#[test]
fn test_undeclared_dependency_names_type_parameter_and_function() {
    let types = "\
INT:
    CTYPE: igraph_integer_t
    CALL: %C1%
DOUBLE:
    CTYPE: igraph_real_t
ERROR:
    CTYPE: igraph_error_t
";
    let (text, s) = render("RC", "bad:\n    PARAMS: INT a\nok:\n    PARAMS: DOUBLE x\n", types);

    assert!(text.contains("SEXP R_ok(SEXP x)"));
    assert!(!text.contains("R_bad"));
    assert_eq!(s.diagnostics().len(), 1);
    let diagnostic = &s.diagnostics()[0];
    assert_eq!(diagnostic.function, "bad");
    assert_eq!(
        diagnostic.message,
        "Missing dependency declaration for INT a in function bad (unresolved %C1%)"
    );
}

/// Block-based backend counting how often its handlers run.
#[derive(Debug)]
struct CountingBackend {
    blocks: BlockRegistry<Self>,
    functions_calls: usize,
    extra_calls: usize,
}

impl CountingBackend {
    fn new() -> Self {
        Self {
            blocks: BlockRegistry::new()
                .with(BlockName::FUNCTIONS, Self::functions)
                .with("extra", Self::extra),
            functions_calls: 0,
            extra_calls: 0,
        }
    }

    fn functions(&mut self, session: &mut Session) -> Result<String> {
        self.functions_calls += 1;
        render_functions(self, session)
    }

    #[allow(clippy::unnecessary_wraps)]
    fn extra(&mut self, _session: &mut Session) -> Result<String> {
        self.extra_calls += 1;
        Ok("// extra\n".to_string())
    }
}

impl Backend for CountingBackend {
    fn name(&self) -> &'static str {
        "Counting"
    }

    fn composition(&self) -> Composition {
        Composition::BlockBased
    }

    fn comment(&self, text: &str) -> String {
        format!("// {text}\n")
    }

    fn render_function(&mut self, _session: &mut Session, function: &str) -> Result<String> {
        Ok(format!("fn {function};\n"))
    }

    fn render_block(&mut self, session: &mut Session, block: &BlockName) -> Result<String> {
        let handler = self.blocks.get(block)?;
        handler(self, session)
    }
}

#[test]
fn test_each_block_renders_once() {
    let mut s = session("f:\ng:\n", "", "Counting");
    let inputs = Inputs::new(
        vec![InputFile::new(
            "template",
            "head\n%STIMULUS%\nmiddle\n  %STIMULUS:extra%\n%STIMULUS:%\ntail\n",
        )],
        Vec::new(),
    );
    let mut backend = CountingBackend::new();
    let text = generate(&mut backend, &mut s, &inputs).unwrap();

    assert_eq!(backend.functions_calls, 1);
    assert_eq!(backend.extra_calls, 1);
    assert_eq!(
        text,
        "head\nfn f;\nfn g;\nmiddle\n// extra\nfn f;\nfn g;\ntail\n"
    );
}

#[test]
fn test_unhandled_block_aborts() {
    let mut s = session("f:\n", "", "Counting");
    let inputs = Inputs::new(vec![InputFile::new("t", "%STIMULUS:nope%\n")], Vec::new());
    let err = generate(&mut CountingBackend::new(), &mut s, &inputs).unwrap_err();
    assert!(matches!(err, Error::UnhandledBlock { ref block } if block == "nope"));
}

#[test]
fn test_custom_sigil() {
    let mut catalog = Catalog::new();
    catalog.load_functions(&parse_str("f:\n").unwrap()).unwrap();
    let config = GeneratorConfig::builder().block_sigil("GEN").build();
    let mut s = Session::new(catalog, "Counting", config);
    let inputs = Inputs::new(
        vec![InputFile::new("t", "%STIMULUS%\n%GEN%\n")],
        Vec::new(),
    );
    let text = generate(&mut CountingBackend::new(), &mut s, &inputs).unwrap();
    assert_eq!(text, "%STIMULUS%\nfn f;\n");
}

#[test]
fn test_ignored_functions_are_skipped_everywhere() {
    let (text, _) = render(
        "RNamespace",
        "igraph_a:\nigraph_b:\n    IGNORE: RNamespace\nigraph_c:\n    IGNORE: RR\n",
        "",
    );
    assert_eq!(text, "export(graph.a)\nexport(graph.c)\n");
}

#[test]
fn test_job_writes_preamble_functions_and_epilogue() {
    let dir = TempDir::new().unwrap();
    let functions = dir.path().join("functions.def");
    let types = dir.path().join("types.def");
    let head = dir.path().join("head.R");
    let tail = dir.path().join("tail.R");
    let out = dir.path().join("NAMESPACE");
    fs::write(&functions, "igraph_vcount:\n    PARAMS: GRAPH graph\n").unwrap();
    fs::write(&types, "GRAPH:\n").unwrap();
    fs::write(&head, "# head\n").unwrap();
    fs::write(&tail, "# tail\n").unwrap();

    let backend = create_backend("RNamespace", &BackendOptions::default()).unwrap();
    let report = GenerationJob::new(backend, GeneratorConfig::default())
        .function_files([&functions])
        .type_files([&types])
        .inputs([&head])
        .epilogue_inputs([&tail])
        .run(&OutputTarget::File(out.clone()))
        .unwrap();

    assert!(!report.has_diagnostics());
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "# head\nexport(graph.vcount)\n# tail\n"
    );
}

#[test]
fn test_failed_job_leaves_destination_untouched() {
    let dir = TempDir::new().unwrap();
    let functions = dir.path().join("functions.def");
    let out = dir.path().join("out.R");
    fs::write(&functions, "f:\n    PARAMS: INT a\n    PARAM_ORDER: a, a\n").unwrap();
    fs::write(&out, "previous").unwrap();

    let backend = create_backend("RR", &BackendOptions::default()).unwrap();
    let err = GenerationJob::new(backend, GeneratorConfig::default())
        .function_files([&functions])
        .run(&OutputTarget::File(out.clone()))
        .unwrap_err();

    assert!(err.is_structural());
    assert_eq!(fs::read_to_string(&out).unwrap(), "previous");
}

#[test]
fn test_job_merges_function_files_in_order() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("functions.def");
    let overrides = dir.path().join("functions-R.yaml");
    fs::write(&base, "igraph_vcount:\n    PARAMS: GRAPH graph\n").unwrap();
    fs::write(&overrides, "igraph_vcount:\n  NAME-R: vcount\n").unwrap();

    let backend = create_backend("RNamespace", &BackendOptions::default()).unwrap();
    let report = GenerationJob::new(backend, GeneratorConfig::default())
        .function_files([&base, &overrides])
        .render()
        .unwrap();
    assert_eq!(report.text, "export(vcount)\n");
}

#[test]
fn test_rr_docstrings() {
    let dir = TempDir::new().unwrap();
    let docs = dir.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("igraph_vcount.txt"), "@title Vertex count\n\n@param graph The graph.\n").unwrap();

    let options = BackendOptions {
        docstrings: Some(docs),
    };
    let mut backend = create_backend("RR", &options).unwrap();
    let mut s = session("igraph_vcount:\n    PARAMS: GRAPH graph\n", "GRAPH:\nERROR:\n", "RR");
    let text = generate(backend.as_mut(), &mut s, &Inputs::default()).unwrap();

    assert!(text.starts_with("#' @title Vertex count\n#'\n#' @param graph The graph.\n#' @export\ngraph.vcount <- function(graph) {\n"));
}
