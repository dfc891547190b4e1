//! GNU R interface: wrapper functions, C glue and the namespace file.

use crate::backend::Backend;
use crate::context::{FunctionContext, Param, ResultShape};
use crate::docstrings::FolderDocstringProvider;
use crate::session::Session;
use crate::substitute::{Naming, Substitution};
use crate::template_engine::TemplateEngine;
use serde_json::json;
use stimulus_core::Result;
use stimulus_model::{Facet, ParamMode};

fn r_name(name: &str) -> String {
    name.replace('_', ".")
}

fn c_name(name: &str) -> String {
    format!("c_{name}")
}

/// R names: underscores become dots.
const R_NAMING: Naming = Naming::new(r_name, r_name);

/// C glue names: `c_` prefix internally, declared name for the `SEXP`.
const C_NAMING: Naming = Naming::new(c_name, str::to_string);

/// R-side name of a function: `NAME-R`, or the C name without its first
/// letter and with dots (`igraph_vcount` becomes `graph.vcount`).
fn r_function_name(ctx: &FunctionContext<'_>) -> String {
    ctx.descriptor().raw_text("NAME-R").map_or_else(
        || r_name(ctx.name().get(1..).unwrap_or_default()),
        str::to_string,
    )
}

/// Renders `facet` of `param` with an overridden interface name.
fn render_as(
    ctx: &FunctionContext<'_>,
    param: Param<'_>,
    facet: Facet,
    naming: &Naming,
    interface: &str,
) -> Result<Option<String>> {
    param
        .ty
        .template(facet, param.spec.mode)
        .map(|t| ctx.substitution(param, naming).with_interface(interface).apply(t))
        .transpose()
}

fn push_lines(out: &mut String, lines: &[String]) {
    for line in lines {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
}

/// R wrapper functions calling into the C glue (`RR`).
#[derive(Debug, Default)]
pub struct RWrapperBackend {
    docstrings: Option<FolderDocstringProvider>,
}

impl RWrapperBackend {
    /// Creates the backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds roxygen documentation from a docstring folder.
    #[must_use]
    pub fn with_docstrings(mut self, provider: FolderDocstringProvider) -> Self {
        self.docstrings = Some(provider);
        self
    }

    fn header_arg(ctx: &FunctionContext<'_>, param: Param<'_>) -> Result<String> {
        let header = param
            .ty
            .template(Facet::Header, param.spec.mode)
            .unwrap_or("%I%");
        if header.is_empty() {
            return Ok(String::new());
        }
        let mut template = header.to_string();
        if let Some(default) = &param.spec.default {
            template.push('=');
            template.push_str(param.ty.translate_default(default));
        }
        ctx.substitution(param, &R_NAMING).apply(&template)
    }

    fn output_conversions(ctx: &FunctionContext<'_>, shape: &ResultShape<'_>) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        for &param in ctx.params() {
            let interface = match shape {
                ResultShape::Aggregate(_) => format!("res${}", param.spec.display_name()),
                ResultShape::ReturnValue | ResultShape::Single(_) => "res".to_string(),
            };
            if let Some(text) = render_as(ctx, param, Facet::OutConv, &R_NAMING, &interface)?
                && !text.is_empty()
            {
                lines.push(text);
            }
        }
        if matches!(shape, ResultShape::ReturnValue)
            && let Some(template) = ctx.return_type().template(Facet::OutConv, ParamMode::Out)
            && !template.is_empty()
        {
            let subst = Substitution::new(ctx.name(), "res", ctx.return_type().name());
            lines.push(subst.apply(template)?);
        }
        Ok(lines)
    }

    fn postprocessing(ctx: &FunctionContext<'_>) -> String {
        let descriptor = ctx.descriptor();
        let mut out = String::new();
        if let Some(attrs) = descriptor.raw_text("GATTR-R") {
            for item in attrs.split(',') {
                if let Some((name, value)) = item.split_once(" IS ") {
                    out.push_str(&format!(
                        "  res <- set.graph.attribute(res, '{}', '{}')\n",
                        name.trim(),
                        value.trim().replace('\'', "\\'")
                    ));
                }
            }
        }
        if let Some(params) = descriptor.raw_text("GATTR-PARAM-R") {
            for param in params.split(',').map(|p| r_name(p.trim())) {
                out.push_str(&format!(
                    "  res <- set.graph.attribute(res, '{param}', {param})\n"
                ));
            }
        }
        if let Some(class) = descriptor.raw_text("CLASS-R") {
            out.push_str(&format!("  class(res) <- \"{class}\"\n"));
        }
        if let Some(pp) = descriptor.raw_text("PP-R") {
            out.push_str(&format!("  res <- {pp}(res)\n"));
        }
        out
    }
}

impl Backend for RWrapperBackend {
    fn name(&self) -> &'static str {
        "RR"
    }

    fn comment(&self, text: &str) -> String {
        format!("# ERROR: {text}\n\n")
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        let mut out = String::new();

        if let Some(provider) = &self.docstrings
            && let Some(doc) = provider.get(function)?
        {
            for line in doc.lines() {
                out.push_str(format!("#' {line}").trim_end());
                out.push('\n');
            }
        }
        if !ctx.descriptor().is_internal() {
            out.push_str("#' @export\n");
        }

        let mut header = Vec::new();
        for &param in ctx.ordered().iter().filter(|p| p.spec.is_input()) {
            let arg = Self::header_arg(&ctx, param)?;
            if !arg.is_empty() {
                header.push(arg);
            }
        }
        out.push_str(&format!(
            "{} <- function({}) {{\n",
            r_function_name(&ctx),
            header.join(", ")
        ));

        out.push_str("  # Argument checks\n");
        push_lines(
            &mut out,
            &ctx.render_all(ctx.params(), Facet::InConv, &R_NAMING)?,
        );
        out.push('\n');

        let mut calls = Vec::new();
        for &param in ctx.params().iter().filter(|p| p.spec.is_input()) {
            let call = param.ty.template(Facet::Call, param.spec.mode).unwrap_or("%I%");
            if !call.is_empty() {
                calls.push(ctx.substitution(param, &R_NAMING).apply(call)?);
            }
        }
        out.push_str("  on.exit( .Call(C_R_igraph_finalizer) )\n");
        out.push_str("  # Function call\n");
        out.push_str(&format!(
            "  res <- .Call(C_R_{}, {})\n",
            ctx.name(),
            calls.join(", ")
        ));

        let shape = ctx.shape();
        push_lines(&mut out, &Self::output_conversions(&ctx, &shape)?);
        out.push_str(&Self::postprocessing(&ctx));
        out.push_str("  res\n}\n\n");
        Ok(out)
    }
}

/// Bindings of the return value in the C glue: `c_result` holds the C
/// value, `result` the R object.
fn return_substitution(ctx: &FunctionContext<'_>) -> Substitution {
    let return_type = ctx.return_type();
    Substitution::new(ctx.name(), "result", return_type.name())
        .with_internal("c_result")
        .with_concrete_type(
            return_type
                .c_type(ParamMode::Out)
                .unwrap_or_else(|| return_type.name()),
        )
}

/// C glue between R and the library (`RC`).
#[derive(Debug)]
pub struct RGlueBackend {
    engine: TemplateEngine<'static>,
}

impl RGlueBackend {
    /// Creates the backend.
    ///
    /// # Errors
    ///
    /// Returns [`stimulus_core::Error::TemplateError`] if the skeleton does
    /// not compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
        })
    }

    fn header(ctx: &FunctionContext<'_>) -> Result<String> {
        let mut args = Vec::new();
        for &param in ctx.params().iter().filter(|p| p.spec.is_input()) {
            let header = param
                .ty
                .template(Facet::Header, param.spec.mode)
                .unwrap_or("%I%");
            if !header.is_empty() {
                let arg = ctx.substitution(param, &C_NAMING).apply(header)?;
                args.push(format!("SEXP {arg}"));
            }
        }
        Ok(format!("SEXP R_{}({})", ctx.name(), args.join(", ")))
    }

    fn declarations(ctx: &FunctionContext<'_>, shape: &ResultShape<'_>) -> Result<String> {
        let mut lines = Vec::new();
        for &param in ctx.params() {
            let decl = ctx
                .render(param, Facet::Decl, &C_NAMING)?
                .unwrap_or_else(|| {
                    param
                        .ty
                        .declare_c_variable(&c_name(param.name()), param.spec.mode)
                });
            if !decl.is_empty() {
                lines.push(format!("  {decl}"));
            }
        }
        for param in ctx.params().iter().filter(|p| p.spec.mode == ParamMode::Out) {
            lines.push(format!("  SEXP {};", param.name()));
        }

        let return_type = ctx.return_type();
        let result = return_substitution(ctx);
        if let Some(decl) = return_type.template(Facet::Decl, ParamMode::Out) {
            if !decl.is_empty() {
                lines.push(format!("  {}", result.apply(decl)?));
            }
        } else if matches!(shape, ResultShape::ReturnValue) {
            let decl = return_type.declare_c_variable("c_result", ParamMode::Out);
            if !decl.is_empty() {
                lines.push(format!("  {decl}"));
            }
        }

        lines.push(match shape {
            ResultShape::Aggregate(_) => "  SEXP result, names;".to_string(),
            ResultShape::ReturnValue | ResultShape::Single(_) => "  SEXP result;".to_string(),
        });
        Ok(lines.join("\n"))
    }

    fn call(ctx: &FunctionContext<'_>, shape: &ResultShape<'_>) -> Result<String> {
        let mut args = Vec::new();
        for &param in ctx.params() {
            let call = param.ty.template(Facet::Call, param.spec.mode).unwrap_or("%C%");
            if !call.is_empty() {
                args.push(ctx.substitution(param, &C_NAMING).apply(call)?);
            }
        }
        let assign = if matches!(shape, ResultShape::ReturnValue) {
            "c_result="
        } else {
            ""
        };
        Ok(format!("  {assign}{}({});", ctx.name(), args.join(", ")))
    }

    fn output_conversions(ctx: &FunctionContext<'_>, shape: &ResultShape<'_>) -> Result<String> {
        let mut lines: Vec<String> = ctx
            .render_all(ctx.params(), Facet::OutConv, &C_NAMING)?
            .into_iter()
            .map(|line| format!("  {line}"))
            .collect();

        match shape {
            ResultShape::ReturnValue => {
                let return_type = ctx.return_type();
                if let Some(template) = return_type.template(Facet::OutConv, ParamMode::Out) {
                    lines.push(format!("  {}", return_substitution(ctx).apply(template)?));
                }
            }
            ResultShape::Single(param) => lines.push(format!("  result={};", param.name())),
            ResultShape::Aggregate(outputs) => {
                let n = outputs.len();
                let mut all = vec![
                    format!("  PROTECT(result=NEW_LIST({n}));"),
                    format!("  PROTECT(names=NEW_CHARACTER({n}));"),
                ];
                all.append(&mut lines);
                for (i, param) in outputs.iter().enumerate() {
                    all.push(format!("  SET_VECTOR_ELT(result, {i}, {});", param.name()));
                }
                for (i, param) in outputs.iter().enumerate() {
                    all.push(format!(
                        "  SET_STRING_ELT(names, {i}, CREATE_STRING_VECTOR(\"{}\"));",
                        param.spec.display_name()
                    ));
                }
                all.push("  SET_NAMES(result, names);".to_string());
                all.push(format!("  UNPROTECT({});", n + 1));
                lines = all;
            }
        }
        Ok(lines.join("\n"))
    }
}

impl Backend for RGlueBackend {
    fn name(&self) -> &'static str {
        "RC"
    }

    fn comment(&self, text: &str) -> String {
        format!("/* ERROR: {} */\n", text.replace("*/", "* /"))
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        let shape = ctx.shape();
        let context = json!({
            "banner": format!("{function:<42}"),
            "header": Self::header(&ctx)?,
            "decl": Self::declarations(&ctx, &shape)?,
            "inconv": ctx
                .render_all(ctx.params(), Facet::InConv, &C_NAMING)?
                .into_iter()
                .map(|line| format!("  {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
            "call": Self::call(&ctx, &shape)?,
            "outconv": Self::output_conversions(&ctx, &shape)?,
        });
        self.engine.render("rc/function", &context)
    }
}

/// `export(...)` lines of the R `NAMESPACE` file (`RNamespace`).
#[derive(Debug, Default)]
pub struct RNamespaceBackend;

impl Backend for RNamespaceBackend {
    fn name(&self) -> &'static str {
        "RNamespace"
    }

    fn comment(&self, text: &str) -> String {
        format!("# ERROR: {text}\n")
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let descriptor = session.function(function)?;
        let name = descriptor.raw_text("NAME-R").map_or_else(
            || r_name(function.get(1..).unwrap_or_default()),
            str::to_string,
        );
        Ok(format!("export({name})\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stimulus_core::GeneratorConfig;
    use stimulus_model::Catalog;
    use stimulus_parser::parse_str;

    const TYPES_R: &str = "\
GRAPH:
    INCONV: %I% <- as_igraph(%I%)
    OUTCONV:
        OUT: class(%I%) <- \"igraph\"
INT:
    INCONV: %I% <- as.numeric(%I%)
REAL:
    OUTCONV:
        OUT: %I% <- as.numeric(%I%)
NEIMODE:
    DEFAULT:
        ALL: c(\"all\", \"out\", \"in\")
ERROR:
    HEADER:
    CALL:
";

    fn session(functions: &str, types: &str, backend: &str) -> Session {
        let mut catalog = Catalog::new();
        catalog.load_functions(&parse_str(functions).unwrap()).unwrap();
        catalog.load_types(&parse_str(types).unwrap()).unwrap();
        Session::new(catalog, backend, GeneratorConfig::default())
    }

    #[test]
    fn test_rr_wrapper_single_output() {
        let mut s = session(
            "igraph_degree_x:\n    PARAMS: GRAPH graph, NEIMODE mode=ALL, OUT REAL res\n",
            TYPES_R,
            "RR",
        );
        let text = RWrapperBackend::new()
            .render_function(&mut s, "igraph_degree_x")
            .unwrap();

        assert!(text.starts_with("#' @export\ngraph.degree.x <- function(graph, mode=c(\"all\", \"out\", \"in\")) {\n"));
        assert!(text.contains("  graph <- as_igraph(graph)\n"));
        assert!(text.contains("  res <- .Call(C_R_igraph_degree_x, graph, mode)\n"));
        assert!(text.contains("  res <- as.numeric(res)\n"));
        assert!(text.ends_with("  res\n}\n\n"));
    }

    #[test]
    fn test_rr_internal_and_name_override() {
        let mut s = session(
            "igraph_f:\n    PARAMS: INT n\n    INTERNAL: true\n    NAME-R: .f_impl\n    CLASS-R: myclass\n",
            TYPES_R,
            "RR",
        );
        let text = RWrapperBackend::new().render_function(&mut s, "igraph_f").unwrap();
        assert!(text.starts_with(".f_impl <- function(n) {\n"));
        assert!(text.contains("  class(res) <- \"myclass\"\n"));
    }

    #[test]
    fn test_rr_aggregate_uses_list_members() {
        let mut s = session(
            "igraph_f:\n    PARAMS: GRAPH graph, OUT REAL a, OUT REAL b\n",
            TYPES_R,
            "RR",
        );
        let text = RWrapperBackend::new().render_function(&mut s, "igraph_f").unwrap();
        assert!(text.contains("  res$a <- as.numeric(res$a)\n"));
        assert!(text.contains("  res$b <- as.numeric(res$b)\n"));
    }

    #[test]
    fn test_rc_return_value() {
        let mut s = session(
            "igraph_vcount:\n    PARAMS: GRAPH graph\n    RETURN: INT\n",
            "GRAPH:\n    CTYPE: igraph_t\n    INCONV: R_SEXP_to_igraph(%I%, &%C%);\n    CALL: &%C%\nINT:\n    CTYPE: igraph_integer_t\n    OUTCONV:\n        OUT: PROTECT(%I%=NEW_NUMERIC(1)); REAL(%I%)[0]=%C%;\n",
            "RC",
        );
        let text = RGlueBackend::new()
            .unwrap()
            .render_function(&mut s, "igraph_vcount")
            .unwrap();

        assert!(text.contains("SEXP R_igraph_vcount(SEXP graph) {"));
        assert!(text.contains("  igraph_t c_graph;\n"));
        assert!(text.contains("  igraph_integer_t c_result;\n  SEXP result;\n"));
        assert!(text.contains("  R_SEXP_to_igraph(graph, &c_graph);\n"));
        assert!(text.contains("  c_result=igraph_vcount(&c_graph);\n"));
        assert!(text.contains("  PROTECT(result=NEW_NUMERIC(1)); REAL(result)[0]=c_result;\n"));
    }

    #[test]
    fn test_namespace_lines() {
        let mut s = session("igraph_vcount:\nigraph_f:\n    NAME-R: my.f\n", "", "RNamespace");
        let mut backend = RNamespaceBackend;
        assert_eq!(
            backend.render_function(&mut s, "igraph_vcount").unwrap(),
            "export(graph.vcount)\n"
        );
        assert_eq!(
            backend.render_function(&mut s, "igraph_f").unwrap(),
            "export(my.f)\n"
        );
    }
}
