//! Java interface over JNI: native method declarations and their C glue.

use crate::backend::{Backend, Composition, render_functions};
use crate::blocks::BlockRegistry;
use crate::context::{FunctionContext, Param};
use crate::session::Session;
use crate::substitute::{Naming, Substitution};
use crate::template_engine::TemplateEngine;
use serde::Serialize;
use stimulus_core::{BlockName, Error, Result};
use stimulus_model::{Facet, NAME_TOKEN, ParamMode, TypeDescriptor};

const JAVA_TYPE: &str = "JAVATYPE";
const JAVA_DECL: &str = "JAVADECL";
const JAVA_NAME_TOKEN: &str = "%J%";
const SELF_TYPE: &str = "GRAPH";
const JAVA_PACKAGE: &str = "net.sf.igraph";
const JAVA_CLASS: &str = "Graph";
const C_RESULT: &str = "c__result";

/// Java class body with `native` method declarations (`JavaJava`).
///
/// The input files are Java sources; a `%STIMULUS%` line is replaced by
/// the declarations of every generatable function.
///
/// Functions are exposed with the simplified return convention: when any
/// parameter is `PRIMARY`, only primary outputs are returned; otherwise all
/// outputs are. An output that is not returned must be `OPTIONAL`, and at
/// most one output can be returned.
#[derive(Debug)]
pub struct JavaBackend {
    blocks: BlockRegistry<Self>,
}

impl JavaBackend {
    /// Creates the backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: BlockRegistry::new().with(BlockName::FUNCTIONS, Self::functions_handler),
        }
    }

    fn functions_handler(&mut self, session: &mut Session) -> Result<String> {
        render_functions(self, session)
    }
}

impl Default for JavaBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// `igraph_get_edge_list` becomes `getEdgeList`.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(part);
        } else {
            out.push_str(&capitalize(part));
        }
    }
    out
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn java_type<'a>(function: &str, ty: &'a TypeDescriptor) -> Result<&'a str> {
    ty.raw_text(JAVA_TYPE)
        .ok_or_else(|| Error::CalleeConventionUnsupported {
            function: function.to_string(),
            reason: format!("type {} has no {JAVA_TYPE}", ty.name()),
        })
}

/// Outputs forming the simplified return surface of `ctx`.
fn returned_outputs<'a>(ctx: &FunctionContext<'a>) -> Result<Vec<Param<'a>>> {
    let any_primary = ctx.params().iter().any(|p| p.spec.primary);
    let mut returned = Vec::new();
    for &param in ctx.ordered().iter().filter(|p| p.spec.is_output()) {
        if !any_primary || param.spec.primary {
            returned.push(param);
        } else if !param.spec.optional {
            return Err(Error::CalleeConventionUnsupported {
                function: ctx.name().to_string(),
                reason: format!(
                    "output '{}' is neither returned nor optional",
                    param.name()
                ),
            });
        }
    }
    if returned.len() > 1 {
        return Err(Error::UnsupportedMultiOutput {
            function: ctx.name().to_string(),
            count: returned.len(),
        });
    }
    Ok(returned)
}

/// A function seen as a method of the Java `Graph` class.
#[derive(Debug)]
struct JavaMethod<'a> {
    name: String,
    /// The `GRAPH` input acting as `this`; `None` for static methods.
    this: Option<Param<'a>>,
    /// The output returned by the method, if any.
    returned: Option<Param<'a>>,
    /// `JAVATYPE` of the result; `None` means `void`.
    return_type: Option<&'a str>,
    /// Method arguments with their `JAVATYPE`, in signature order.
    args: Vec<(&'a str, Param<'a>)>,
}

impl<'a> JavaMethod<'a> {
    fn resolve(ctx: &FunctionContext<'a>) -> Result<Self> {
        let function = ctx.name();
        let returned = returned_outputs(ctx)?.into_iter().next();

        let this = ctx
            .ordered()
            .iter()
            .find(|p| p.spec.is_input() && !p.spec.is_output() && p.spec.type_name == SELF_TYPE)
            .copied();

        let mut args = Vec::new();
        for &param in ctx.ordered() {
            if this.is_some_and(|t| t.name() == param.name()) || !param.spec.is_input() {
                continue;
            }
            args.push((java_type(function, param.ty)?, param));
        }

        let return_type = match returned {
            Some(param) => Some(java_type(function, param.ty)?),
            None => ctx.return_type().raw_text(JAVA_TYPE),
        };

        let base = ctx.descriptor().raw_text("NAME-JAVA").map_or_else(
            || camel_case(function.strip_prefix("igraph_").unwrap_or(function)),
            str::to_string,
        );
        let name = if this.is_some() { base } else { capitalize(&base) };

        Ok(Self {
            name,
            this,
            returned,
            return_type,
            args,
        })
    }

    const fn is_static(&self) -> bool {
        self.this.is_none()
    }

    fn return_type(&self) -> &'a str {
        self.return_type.unwrap_or("void")
    }

    fn arg_list(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|(ty, param)| format!("{ty} {}", camel_case(param.name())))
            .collect()
    }
}

impl Backend for JavaBackend {
    fn name(&self) -> &'static str {
        "JavaJava"
    }

    fn composition(&self) -> Composition {
        Composition::BlockBased
    }

    fn comment(&self, text: &str) -> String {
        format!("    // {}\n", text.replace('\n', " "))
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        let method = JavaMethod::resolve(&ctx)?;
        let modifiers = if method.is_static() {
            "public static native"
        } else {
            "public native"
        };
        Ok(format!(
            "    {modifiers} {} {}({});\n",
            method.return_type(),
            method.name,
            method.arg_list().join(", ")
        ))
    }

    fn render_block(&mut self, session: &mut Session, block: &BlockName) -> Result<String> {
        let handler = self.blocks.get(block)?;
        handler(self, session)
    }
}

fn c_name(name: &str) -> String {
    format!("c_{name}")
}

fn j_name(name: &str) -> String {
    format!("j_{name}")
}

/// Input side: `c_` variables, the JNI argument as `%I%`.
const JNI_IN_NAMING: Naming = Naming::new(c_name, camel_case);

/// Output side: `c_` variables converted into `j_` variables.
const JNI_OUT_NAMING: Naming = Naming::new(c_name, j_name);

/// Declaration of a Java-side variable: `JAVADECL` with `%J%` standing for
/// the name, or `JAVATYPE name;`.
fn java_declaration(ty: &TypeDescriptor, name: &str) -> Option<String> {
    ty.raw_text(JAVA_DECL)
        .map(|decl| decl.replace(JAVA_NAME_TOKEN, name))
        .or_else(|| ty.raw_text(JAVA_TYPE).map(|t| format!("{t} {name};")))
}

/// Skeleton context of one JNI function.
#[derive(Debug, Serialize)]
struct GlueChunks {
    banner: String,
    header: String,
    decl: String,
    inconv: String,
    call: String,
    outconv: String,
    ret: String,
}

/// C glue implementing the native methods of [`JavaBackend`] (`JavaC`).
///
/// Each function becomes a `JNIEXPORT` entry point that converts its
/// arguments, calls the library between `Java_igraph_before()` and
/// `Java_igraph_after()`, and converts the returned output. The method
/// shape (instance or static, returned output, argument order) is the one
/// [`JavaBackend`] declares.
#[derive(Debug)]
pub struct JavaGlueBackend {
    engine: TemplateEngine<'static>,
}

impl JavaGlueBackend {
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

    fn header(method: &JavaMethod<'_>) -> String {
        let receiver = method.this.map_or_else(
            || "jclass cls".to_string(),
            |this| format!("jobject {}", camel_case(this.name())),
        );
        let mut args = vec!["JNIEnv *env".to_string(), receiver];
        args.extend(method.arg_list());
        format!(
            "JNIEXPORT {} JNICALL Java_{}_{JAVA_CLASS}_{}({})",
            method.return_type(),
            JAVA_PACKAGE.replace('.', "_"),
            method.name,
            args.join(", ")
        )
    }

    fn declarations(ctx: &FunctionContext<'_>, method: &JavaMethod<'_>) -> Result<String> {
        let mut lines = Vec::new();
        for &param in ctx.params() {
            let decl = ctx
                .render(param, Facet::CDecl, &JNI_IN_NAMING)?
                .unwrap_or_else(|| {
                    param
                        .ty
                        .declare_c_variable(&c_name(param.name()), param.spec.mode)
                });
            lines.push(decl);
        }
        for param in ctx.params().iter().filter(|p| p.spec.mode == ParamMode::Out) {
            lines.extend(java_declaration(param.ty, &j_name(param.name())));
        }

        let return_type = ctx.return_type();
        lines.push(return_type.declare_c_variable(C_RESULT, ParamMode::Out));
        let result_type = method.returned.map_or(return_type, |p| p.ty);
        lines.extend(java_declaration(result_type, "result"));

        if let Some(this) = method.this
            && result_type.name() == SELF_TYPE
        {
            lines.push(format!(
                "jclass cls = (*env)->GetObjectClass(env, {});",
                camel_case(this.name())
            ));
        }

        Ok(lines
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn call(ctx: &FunctionContext<'_>) -> Result<String> {
        let mut args = Vec::new();
        for &param in ctx.params() {
            let call = param
                .ty
                .template(Facet::Call, param.spec.mode)
                .unwrap_or(NAME_TOKEN);
            if !call.is_empty() {
                args.push(ctx.substitution(param, &JNI_IN_NAMING).apply(call)?);
            }
        }
        Ok(format!(
            "  if ((*env)->ExceptionCheck(env)) {{\n    {C_RESULT} = IGRAPH_EINVAL;\n  }} else {{\n    {C_RESULT} = {}({});\n  }}",
            ctx.name(),
            args.join(", ")
        ))
    }

    fn output_conversions(ctx: &FunctionContext<'_>, method: &JavaMethod<'_>) -> Result<String> {
        let mut lines = ctx.render_all(ctx.params(), Facet::OutConv, &JNI_OUT_NAMING)?;

        let Some(returned) = method.returned else {
            let return_type = ctx.return_type();
            if let Some(template) = return_type.template(Facet::OutConv, ParamMode::Out)
                && !template.is_empty()
            {
                let mut result = Substitution::new(ctx.name(), C_RESULT, return_type.name())
                    .with_interface("result");
                if let Some(c_type) = return_type.c_type(ParamMode::Out) {
                    result = result.with_concrete_type(c_type);
                }
                lines.push(result.apply(template)?);
            }
            return Ok(lines
                .iter()
                .map(|line| format!("  {line}"))
                .collect::<Vec<_>>()
                .join("\n"));
        };

        lines.push(if returned.spec.mode == ParamMode::Out {
            format!("result = {};", j_name(returned.name()))
        } else {
            format!("result = {};", camel_case(returned.name()))
        });
        let mut guarded = vec![format!("if ({C_RESULT} == 0) {{")];
        guarded.extend(lines.iter().map(|line| format!("  {line}")));
        guarded.extend(["} else {", "  result = 0;", "}"].map(str::to_string));
        Ok(guarded
            .iter()
            .map(|line| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

impl Backend for JavaGlueBackend {
    fn name(&self) -> &'static str {
        "JavaC"
    }

    fn comment(&self, text: &str) -> String {
        format!("/* {} */\n", text.replace("*/", "* /"))
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        let method = JavaMethod::resolve(&ctx)?;
        let chunks = GlueChunks {
            banner: format!("{function:<42}"),
            header: Self::header(&method),
            decl: Self::declarations(&ctx, &method)?,
            inconv: ctx
                .render_all(ctx.params(), Facet::InConv, &JNI_IN_NAMING)?
                .into_iter()
                .map(|line| format!("  {line}"))
                .collect::<Vec<_>>()
                .join("\n"),
            call: Self::call(&ctx)?,
            outconv: Self::output_conversions(&ctx, &method)?,
            ret: if method.return_type.is_some() {
                "  return result;".to_string()
            } else {
                "  return;".to_string()
            },
        };
        self.engine.render("java/function", &chunks)
    }
}
