//! Python bindings on top of the `ctypes` module.

use crate::backend::{Backend, render_functions};
use crate::context::{FunctionContext, Param};
use crate::session::Session;
use crate::substitute::Naming;
use std::collections::BTreeSet;
use stimulus_core::{Error, Result};
use stimulus_model::{DEFAULT_RETURN_TYPE, Facet, NAME_TOKEN, ParamMode, TypeDescriptor};

const CTYPES_RETURN_TYPE: &str = "CTYPES_RETURN_TYPE";
const PY_TYPE: &str = "PY_TYPE";
const VOID_TYPE: &str = "VOID";

/// C scalar types that `ctypes` exposes with a `c_` prefix.
const CTYPES_PRIMITIVES: &[&str] = &[
    "char", "int", "float", "double", "size_t", "ssize_t", "bool", "void",
];

/// Parameter names that are Python keywords.
const PY_KEYWORDS: &[&str] = &["from", "in", "lambda"];

fn unsupported(function: &str, reason: impl Into<String>) -> Error {
    Error::CalleeConventionUnsupported {
        function: function.to_string(),
        reason: reason.into(),
    }
}

/// Maps a C type to its `ctypes` spelling.
///
/// `const` qualifiers are dropped, scalars get the `c_` prefix and every
/// `*` becomes a `POINTER(...)` wrapper, except that `char*` and `void*`
/// use the dedicated `c_char_p` and `c_void_p`. A plain `void` is `None`.
fn ctypes_type(c_type: &str) -> String {
    let mut base = c_type.trim();
    while let Some(rest) = base.strip_prefix("const ") {
        base = rest.trim_start();
    }
    let mut pointers = 0;
    while let Some(rest) = base.strip_suffix('*') {
        base = rest.trim_end();
        pointers += 1;
    }

    let mut name = if CTYPES_PRIMITIVES.contains(&base) {
        format!("c_{base}")
    } else {
        base.to_string()
    };
    if pointers > 0 && matches!(name.as_str(), "c_void" | "c_char" | "c_wchar") {
        pointers -= 1;
        name.push_str("_p");
    }
    for _ in 0..pointers {
        name = format!("POINTER({name})");
    }
    if name == "c_void" {
        "None".to_string()
    } else {
        name
    }
}

/// C type of `param` as an argument of the underlying call, or `None` when
/// its `CALL` template leaves it out.
///
/// An argument passed as `&...` or flagged `BY_REF` is a pointer.
fn c_argument_type(function: &str, param: Param<'_>) -> Result<Option<String>> {
    let mode = param.spec.mode;
    let call = param.ty.template(Facet::Call, mode).unwrap_or(NAME_TOKEN);
    if call.is_empty() {
        return Ok(None);
    }
    let c_type = param.ty.c_type(mode).ok_or_else(|| {
        unsupported(
            function,
            format!("type {} has no CTYPE for mode {mode}", param.ty.name()),
        )
    })?;
    if c_type.is_empty() {
        return Ok(None);
    }
    if call.trim_start().starts_with('&') || param.ty.is_by_ref() {
        Ok(Some(format!("{c_type}*")))
    } else {
        Ok(Some(c_type.to_string()))
    }
}

/// Argument and return type declarations for the functions of the C library
/// loaded through `ctypes` (`PythonCTypes`).
///
/// The generated snippet assumes a `_lib` handle to the shared library and
/// every C type name aliased to its `ctypes` counterpart. Enum and bitfield
/// types seen along the way are aliased to `c_int` ahead of the functions.
#[derive(Debug, Default)]
pub struct PythonCTypesBackend {
    enum_types: BTreeSet<String>,
    bitfield_types: BTreeSet<String>,
}

impl PythonCTypesBackend {
    /// Creates the backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn remember(
        &self,
        ty: &TypeDescriptor,
        ctypes: &str,
        enums: &mut Vec<String>,
        bitfields: &mut Vec<String>,
    ) {
        if ty.is_enum() && !self.enum_types.contains(ctypes) {
            enums.push(ctypes.to_string());
        }
        if ty.is_bitfield() && !self.bitfield_types.contains(ctypes) {
            bitfields.push(ctypes.to_string());
        }
    }
}

impl Backend for PythonCTypesBackend {
    fn name(&self) -> &'static str {
        "PythonCTypes"
    }

    fn comment(&self, text: &str) -> String {
        format!("\n# {}\n", text.replace('\n', " "))
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        let (mut enums, mut bitfields) = (Vec::new(), Vec::new());

        let return_type = ctx.return_type();
        let restype = return_type
            .raw_text(CTYPES_RETURN_TYPE)
            .map(str::to_string)
            .or_else(|| return_type.c_type(ParamMode::Out).map(ctypes_type))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                unsupported(
                    function,
                    format!("no ctypes return type known for abstract type {}", return_type.name()),
                )
            })?;
        self.remember(return_type, &restype, &mut enums, &mut bitfields);

        let mut argtypes = Vec::new();
        for &param in ctx.params() {
            if let Some(c_type) = c_argument_type(function, param)? {
                let ctypes = ctypes_type(&c_type);
                self.remember(param.ty, &ctypes, &mut enums, &mut bitfields);
                argtypes.push(ctypes);
            }
        }

        self.enum_types.extend(enums);
        self.bitfield_types.extend(bitfields);
        Ok(format!(
            "\n{function} = _lib.{function}\n{function}.restype = {restype}\n{function}.argtypes = [{}]\n",
            argtypes.join(", ")
        ))
    }

    fn functions_block(&mut self, session: &mut Session) -> Result<String> {
        let body = render_functions(self, session)?;

        let mut out = String::new();
        for (kind, aliases) in [("enum", &self.enum_types), ("bitfield", &self.bitfield_types)] {
            if aliases.is_empty() {
                continue;
            }
            out.push_str(&format!("# Set up aliases for all {kind} types\n\n"));
            for alias in aliases {
                out.push_str(&format!("{alias} = c_int\n"));
            }
            out.push('\n');
        }
        out.push_str("# Add argument and return types for functions imported from igraph\n");
        out.push_str(&body);
        Ok(out)
    }
}

fn c_name(name: &str) -> String {
    format!("c_{name}")
}

fn py_name(name: &str) -> String {
    if PY_KEYWORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// `c_` variables internally, keyword-safe names in the Python signature.
const PY_NAMING: Naming = Naming::new(c_name, py_name);

fn py_type<'a>(function: &str, ty: &'a TypeDescriptor) -> Result<&'a str> {
    ty.raw_text(PY_TYPE)
        .ok_or_else(|| unsupported(function, format!("no Python type known for type {}", ty.name())))
}

/// Type-annotated Python functions calling the `ctypes` layer
/// (`PythonCTypesTypedWrapper`).
///
/// Every input becomes a keyword-safe, annotated argument in signature
/// order. Pure outputs are returned, after the converted C return value if
/// the function's return type is neither `ERROR` nor `VOID`; several
/// returned values form a `Tuple`.
#[derive(Debug, Default)]
pub struct PythonTypedWrapperBackend;

impl PythonTypedWrapperBackend {
    /// Creates the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn python_name(ctx: &FunctionContext<'_>) -> String {
        ctx.descriptor().raw_text("NAME").map_or_else(
            || {
                ctx.name()
                    .strip_prefix("igraph_")
                    .unwrap_or(ctx.name())
                    .to_string()
            },
            str::to_string,
        )
    }

    fn signature(ctx: &FunctionContext<'_>) -> Result<String> {
        let mut args = Vec::new();
        let mut seen_default = false;
        for &param in ctx.ordered().iter().filter(|p| p.spec.is_input()) {
            let annotation = format!("{}: {}", py_name(param.name()), py_type(ctx.name(), param.ty)?);
            match param.spec.default.as_deref() {
                Some(default) => {
                    seen_default = true;
                    args.push(format!("{annotation} = {}", param.ty.translate_default(default)));
                }
                None if seen_default => {
                    return Err(unsupported(
                        ctx.name(),
                        format!(
                            "a default argument precedes non-default argument {}",
                            param.name()
                        ),
                    ));
                }
                None => args.push(annotation),
            }
        }
        Ok(args.join(", "))
    }

    fn input_conversions(ctx: &FunctionContext<'_>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for &param in ctx.params() {
            let input = param.spec.is_input();
            let fallback = if input { "%C% = %I%" } else { "" };
            let template = param
                .ty
                .template(Facet::InConv, param.spec.mode)
                .unwrap_or(fallback);
            if template.is_empty() {
                if input {
                    continue;
                }
                return Err(unsupported(
                    ctx.name(),
                    format!("cannot construct an instance of abstract type {}", param.ty.name()),
                ));
            }
            lines.push(ctx.substitution(param, &PY_NAMING).apply(template)?);
        }
        Ok(lines)
    }

    fn output_conversions(ctx: &FunctionContext<'_>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for &param in ctx.params() {
            let fallback = if param.spec.is_output() {
                "%I% = %C%.value"
            } else {
                ""
            };
            let template = param
                .ty
                .template(Facet::OutConv, param.spec.mode)
                .unwrap_or(fallback);
            if !template.is_empty() {
                lines.push(ctx.substitution(param, &PY_NAMING).apply(template)?);
            }
        }
        Ok(lines)
    }
}

impl Backend for PythonTypedWrapperBackend {
    fn name(&self) -> &'static str {
        "PythonCTypesTypedWrapper"
    }

    fn comment(&self, text: &str) -> String {
        format!("\n# {}\n", text.replace('\n', " "))
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        for &param in ctx.params() {
            py_type(function, param.ty)?;
        }

        let return_type = ctx.return_type();
        let returns_value = !matches!(return_type.name(), DEFAULT_RETURN_TYPE | VOID_TYPE);
        let outputs: Vec<Param<'_>> = ctx
            .params()
            .iter()
            .filter(|p| !p.spec.is_input())
            .copied()
            .collect();

        let mut returned_types = Vec::new();
        if returns_value {
            returned_types.push(py_type(function, return_type)?);
        }
        for param in &outputs {
            returned_types.push(py_type(function, param.ty)?);
        }
        let annotation = match returned_types.as_slice() {
            [] => "None".to_string(),
            [single] => (*single).to_string(),
            many => format!("Tuple[{}]", many.join(", ")),
        };

        let mut lines = vec![
            String::new(),
            format!(
                "def {}({}) -> {annotation}:",
                Self::python_name(&ctx),
                Self::signature(&ctx)?
            ),
            format!("    \"\"\"Type-annotated wrapper for ``{function}``.\"\"\""),
        ];

        let inconv = Self::input_conversions(&ctx)?;
        if !inconv.is_empty() {
            lines.push("    # Prepare input arguments".to_string());
            lines.extend(inconv.into_iter().map(|line| format!("    {line}")));
            lines.push(String::new());
        }

        lines.push("    # Call wrapped function".to_string());
        let c_args: Vec<String> = ctx.params().iter().map(|p| c_name(p.name())).collect();
        let call = format!("{function}({})", c_args.join(", "));
        lines.push(if returns_value {
            format!("    c__result = {call}")
        } else {
            format!("    {call}")
        });

        let outconv = Self::output_conversions(&ctx)?;
        if !outconv.is_empty() {
            lines.push(String::new());
            lines.push("    # Prepare output arguments".to_string());
            lines.extend(outconv.into_iter().map(|line| format!("    {line}")));
        }

        let returned: Vec<String> = returns_value
            .then(|| "c__result".to_string())
            .into_iter()
            .chain(outputs.iter().map(|p| py_name(p.name())))
            .collect();
        if !returned.is_empty() {
            lines.push(String::new());
            lines.push("    # Construct return value".to_string());
            lines.push(format!("    return {}", returned.join(", ")));
        }

        Ok(format!("\n{}\n", lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Inputs;
    use crate::engine::generate;
    use stimulus_core::GeneratorConfig;
    use stimulus_model::Catalog;
    use stimulus_parser::parse_str;

    const TYPES: &str = "\
GRAPH:
    CTYPE: igraph_t
    CALL: '&%C%'
    PY_TYPE: Graph
    INCONV:
        IN: '%C% = %I%.c_graph'
INTEGER:
    CTYPE: igraph_integer_t
    PY_TYPE: int
    INCONV:
        OUT: '%C% = igraph_integer_t()'
    CALL:
        IN: '%C%'
        OUT: '&%C%'
VECTOR:
    CTYPE: igraph_vector_t
    CALL: '&%C%'
    PY_TYPE: Iterable[float]
    INCONV:
        IN: '%C% = vector_from(%I%, %C1%)'
        OUT: '%C% = vector_new()'
    OUTCONV:
        OUT: '%I% = vector_to_list(%C%)'
NEIMODE:
    CTYPE: igraph_neimode_t
    PY_TYPE: NeighborMode
    FLAGS: ENUM
    DEFAULT:
        ALL: NeighborMode.ALL
REAL:
    CTYPE: igraph_real_t
    PY_TYPE: float
    CTYPES_RETURN_TYPE: c_double
VOID:
    CTYPE: void
ERROR:
    CTYPE: igraph_error_t
    CTYPES_RETURN_TYPE: handle_igraph_error_t
";

    fn session(functions: &str, backend: &str) -> Session {
        let mut catalog = Catalog::new();
        catalog.load_functions(&parse_str(functions).unwrap()).unwrap();
        catalog
            .load_types(&stimulus_parser::from_yaml_str(TYPES, "types-PY.yaml").unwrap())
            .unwrap();
        Session::new(catalog, backend, GeneratorConfig::default())
    }

    #[test]
    fn test_ctypes_type_mapping() {
        assert_eq!(ctypes_type("int"), "c_int");
        assert_eq!(ctypes_type("const char*"), "c_char_p");
        assert_eq!(ctypes_type("void *"), "c_void_p");
        assert_eq!(ctypes_type("void"), "None");
        assert_eq!(ctypes_type("const igraph_t *"), "POINTER(igraph_t)");
        assert_eq!(ctypes_type("double**"), "POINTER(POINTER(c_double))");
        assert_eq!(ctypes_type("char **"), "POINTER(c_char_p)");
        assert_eq!(ctypes_type("igraph_integer_t"), "igraph_integer_t");
    }

    #[test]
    fn test_ctypes_declarations() {
        let mut s = session(
            "igraph_degree:\n    PARAMS: GRAPH graph, OUT VECTOR res, NEIMODE mode=ALL\nigraph_vcount:\n    PARAMS: GRAPH graph\n    RETURN: REAL\n",
            "PythonCTypes",
        );
        let text = generate(&mut PythonCTypesBackend::new(), &mut s, &Inputs::default()).unwrap();

        assert_eq!(
            text,
            "# Set up aliases for all enum types\n\n\
             igraph_neimode_t = c_int\n\n\
             # Add argument and return types for functions imported from igraph\n\n\
             igraph_degree = _lib.igraph_degree\n\
             igraph_degree.restype = handle_igraph_error_t\n\
             igraph_degree.argtypes = [POINTER(igraph_t), POINTER(igraph_vector_t), igraph_neimode_t]\n\n\
             igraph_vcount = _lib.igraph_vcount\n\
             igraph_vcount.restype = c_double\n\
             igraph_vcount.argtypes = [POINTER(igraph_t)]\n"
        );
    }

    #[test]
    fn test_ctypes_return_type_derived_from_c_type() {
        let mut s = session(
            "igraph_f:\n    PARAMS: OUT INTEGER n\n    RETURN: VOID\nigraph_g:\n    RETURN: INTEGER\n",
            "PythonCTypes",
        );
        let mut backend = PythonCTypesBackend::new();
        let text = backend.render_function(&mut s, "igraph_f").unwrap();
        assert!(text.contains("igraph_f.restype = None\n"));
        assert!(text.contains("igraph_f.argtypes = [POINTER(igraph_integer_t)]\n"));

        let text = backend.render_function(&mut s, "igraph_g").unwrap();
        assert!(text.contains("igraph_g.restype = igraph_integer_t\n"));
        assert!(text.contains("igraph_g.argtypes = []\n"));
    }

    #[test]
    fn test_ctypes_failure_becomes_comment() {
        let mut s = session(
            "igraph_bad:\n    PARAMS: MATRIX m\nigraph_ok:\n    PARAMS: GRAPH graph\n",
            "PythonCTypes",
        );
        let text = generate(&mut PythonCTypesBackend::new(), &mut s, &Inputs::default()).unwrap();
        assert!(text.contains("\n# Unknown type 'MATRIX' in function 'igraph_bad'\n"));
        assert!(text.contains("igraph_ok = _lib.igraph_ok\n"));
        assert_eq!(s.diagnostics().len(), 1);
    }

    #[test]
    fn test_typed_wrapper_function() {
        let mut s = session(
            "igraph_degree:\n    PARAMS: GRAPH graph, OUT VECTOR res, VECTOR from, NEIMODE mode=ALL\n    DEPS: from ON graph\n",
            "PythonCTypesTypedWrapper",
        );
        let text = PythonTypedWrapperBackend::new()
            .render_function(&mut s, "igraph_degree")
            .unwrap();

        assert_eq!(
            text,
            "\n\ndef degree(graph: Graph, from_: Iterable[float], mode: NeighborMode = NeighborMode.ALL) -> Iterable[float]:\n\
             \x20   \"\"\"Type-annotated wrapper for ``igraph_degree``.\"\"\"\n\
             \x20   # Prepare input arguments\n\
             \x20   c_graph = graph.c_graph\n\
             \x20   c_res = vector_new()\n\
             \x20   c_from = vector_from(from_, c_graph)\n\
             \x20   c_mode = mode\n\
             \n\
             \x20   # Call wrapped function\n\
             \x20   igraph_degree(c_graph, c_res, c_from, c_mode)\n\
             \n\
             \x20   # Prepare output arguments\n\
             \x20   res = vector_to_list(c_res)\n\
             \n\
             \x20   # Construct return value\n\
             \x20   return res\n"
        );
    }

    #[test]
    fn test_typed_wrapper_returns_value_and_outputs() {
        let mut s = session(
            "igraph_f:\n    PARAMS: GRAPH graph, OUT INTEGER n\n    RETURN: REAL\n    NAME: count\nigraph_g:\n    PARAMS: GRAPH graph\n",
            "PythonCTypesTypedWrapper",
        );
        let mut backend = PythonTypedWrapperBackend::new();
        let text = backend.render_function(&mut s, "igraph_f").unwrap();
        assert!(text.contains("def count(graph: Graph) -> Tuple[float, int]:\n"));
        assert!(text.contains("    c_n = igraph_integer_t()\n"));
        assert!(text.contains("    c__result = igraph_f(c_graph, c_n)\n"));
        assert!(text.contains("    n = c_n.value\n"));
        assert!(text.contains("    return c__result, n\n"));

        let text = backend.render_function(&mut s, "igraph_g").unwrap();
        assert!(text.contains("def g(graph: Graph) -> None:\n"));
        assert!(text.contains("    igraph_g(c_graph)\n"));
        assert!(!text.contains("return"));
    }

    #[test]
    fn test_typed_wrapper_rejections() {
        let mut s = session(
            "igraph_a:\n    PARAMS: NEIMODE mode=ALL, GRAPH graph\nigraph_b:\n    PARAMS: OUT REAL x\nigraph_c:\n    PARAMS: VOID v\n",
            "PythonCTypesTypedWrapper",
        );
        let mut backend = PythonTypedWrapperBackend::new();

        let err = backend.render_function(&mut s, "igraph_a").unwrap_err();
        assert!(err.to_string().contains("precedes non-default argument graph"));

        let err = backend.render_function(&mut s, "igraph_b").unwrap_err();
        assert!(err.to_string().contains("cannot construct an instance of abstract type REAL"));

        let err = backend.render_function(&mut s, "igraph_c").unwrap_err();
        assert!(err.is_per_function());
        assert!(err.to_string().contains("no Python type known for type VOID"));
    }
}
