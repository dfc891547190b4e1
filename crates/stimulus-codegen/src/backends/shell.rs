//! Command-line wrapper that calls library functions from the shell.

use crate::backend::{Backend, render_guarded};
use crate::context::{FunctionContext, Param};
use crate::session::Session;
use crate::substitute::{Naming, Substitution};
use crate::template_engine::TemplateEngine;
use serde::Serialize;
use stimulus_core::Result;
use stimulus_model::{Facet, ParamMode};

const OPTION_INDENT: &str = "\n                                   ";

/// One `--name` option of a generated command.
#[derive(Debug)]
struct ShellArg<'a> {
    name: String,
    param: Param<'a>,
    mode: ParamMode,
}

/// Skeleton context of one generated command.
#[derive(Debug, Serialize)]
struct FunctionChunks {
    func: String,
    banner: String,
    usage: String,
    decl: String,
    nargs: usize,
    args: String,
    default: String,
    inconv: String,
    call: String,
    outconv: String,
}

/// C program exposing every function as a command named after it (`Shell`).
///
/// The functions block holds the prototypes, a `main` that dispatches on
/// the program name, and one `getopt_long`-based command per function.
#[derive(Debug)]
pub struct ShellBackend {
    engine: TemplateEngine<'static>,
}

impl ShellBackend {
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
}

/// Options of `ctx`: every parameter whose type converts from or to text.
/// `INOUT` parameters take two options, `name` and `name-out`.
fn shell_args<'a>(ctx: &FunctionContext<'a>) -> Vec<ShellArg<'a>> {
    let mut args = Vec::new();
    for &param in ctx.params() {
        let ty = param.ty;
        let mode = param.spec.mode;
        let converts = ty.raw(Facet::InConv.key()).is_some() || ty.raw(Facet::OutConv.key()).is_some();
        if converts {
            if mode == ParamMode::InOut {
                args.push(ShellArg {
                    name: param.name().to_string(),
                    param,
                    mode: ParamMode::In,
                });
                args.push(ShellArg {
                    name: format!("{}-out", param.name()),
                    param,
                    mode: ParamMode::Out,
                });
            } else {
                args.push(ShellArg {
                    name: param.name().to_string(),
                    param,
                    mode,
                });
            }
        }
        for (facet, direction) in [(Facet::InConv, ParamMode::In), (Facet::OutConv, ParamMode::Out)] {
            let needed = if mode == ParamMode::InOut { converts } else { mode == direction };
            if needed && ty.template(facet, direction).is_none() {
                tracing::warn!(
                    "{}: no {facet} for type {}, mode {direction}",
                    ctx.name(),
                    ty.name()
                );
            }
        }
    }
    args
}

fn option_index(args: &[ShellArg<'_>], name: &str) -> Option<usize> {
    args.iter().position(|a| a.name == name)
}

fn chunk_args(args: &[ShellArg<'_>]) -> String {
    args.iter()
        .enumerate()
        .map(|(i, a)| format!("{{ \"{}\", required_argument, 0, {i} }},", a.name))
        .collect::<Vec<_>>()
        .join(OPTION_INDENT)
}

fn chunk_decl(ctx: &FunctionContext<'_>) -> Result<String> {
    let naming = Naming::default();
    let mut lines = Vec::new();
    for &param in ctx.params() {
        let mode = param.spec.mode;
        let decl = param
            .ty
            .template(Facet::Decl, mode)
            .map(|template| ctx.substitution(param, &naming).apply(template))
            .transpose()?
            .unwrap_or_else(|| {
                param
                    .ty
                    .c_type(mode)
                    .map(|c_type| format!("{c_type} {}", param.name()))
                    .unwrap_or_default()
            });
        if decl.is_empty() {
            continue;
        }
        let default = param
            .spec
            .default
            .as_deref()
            .map(|d| format!("={}", param.ty.translate_default(d)))
            .unwrap_or_default();
        lines.push(format!("  {}{default};", decl.trim_end_matches(';')));
    }
    for param in ctx.params().iter().filter(|p| p.spec.is_output()) {
        lines.push(format!("  char* shell_arg_{}=0;", param.name()));
    }

    let return_type = ctx.return_type();
    let result = Substitution::new(ctx.name(), "shell_result", return_type.name());
    if let Some(template) = return_type.template(Facet::Decl, ParamMode::Out) {
        if !template.is_empty() {
            lines.push(format!("  {}", result.apply(template)?));
        }
    } else if let Some(c_type) = return_type.c_type(ParamMode::Out) {
        lines.push(format!("  {c_type} shell_result;"));
    }
    if return_type.name() != stimulus_model::DEFAULT_RETURN_TYPE {
        lines.push("  char *shell_arg_shell_result=\"-\";".to_string());
    }
    Ok(lines.join("\n"))
}

fn chunk_default(ctx: &FunctionContext<'_>, args: &[ShellArg<'_>]) -> String {
    ctx.params()
        .iter()
        .filter(|p| p.spec.default.is_some())
        .filter_map(|p| option_index(args, p.name()))
        .map(|i| format!("  shell_seen[{i}] = 2;"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn chunk_inconv(ctx: &FunctionContext<'_>, args: &[ShellArg<'_>]) -> Result<String> {
    let naming = Naming::default();
    let mut cases = Vec::new();
    for (i, arg) in args.iter().enumerate() {
        let conv = arg
            .param
            .ty
            .template(Facet::InConv, arg.mode)
            .map(|template| ctx.substitution(arg.param, &naming).apply(template))
            .transpose()?
            .unwrap_or_default();
        cases.push(format!(
            "    case {i}: /* {} */\n      {conv}\n      break;",
            arg.name
        ));
    }
    Ok(format!(
        "\n    switch (shell_index) {{\n{}\n    case {}:\n      shell_{}_usage(argv);\n      break;\n    default:\n      break;\n    }}\n",
        cases.join("\n"),
        args.len(),
        ctx.name()
    ))
}

fn chunk_call(ctx: &FunctionContext<'_>) -> Result<String> {
    let naming = Naming::default();
    let mut parts = Vec::new();
    for &param in ctx.params() {
        let template = param
            .ty
            .template(Facet::Call, param.spec.mode)
            .unwrap_or("%C%");
        parts.push(ctx.substitution(param, &naming).apply(template)?);
    }
    Ok(format!("  shell_result = {}({});", ctx.name(), parts.join(", ")))
}

fn chunk_outconv(ctx: &FunctionContext<'_>) -> Result<String> {
    let mut lines: Vec<String> = ctx
        .render_all(ctx.params(), Facet::OutConv, &Naming::default())?
        .into_iter()
        .map(|line| format!("  {line}"))
        .collect();
    let return_type = ctx.return_type();
    if let Some(template) = return_type.template(Facet::OutConv, ParamMode::Out)
        && !template.is_empty()
    {
        let result = Substitution::new(ctx.name(), "shell_result", return_type.name());
        lines.push(format!("  {}", result.apply(template)?));
    }
    Ok(lines.join("\n"))
}

fn chunk_usage(args: &[ShellArg<'_>]) -> String {
    let options = args
        .iter()
        .map(|a| format!("--{0}=<{0}>", a.name))
        .collect::<Vec<_>>()
        .join(" ");
    format!("  printf(\"%s {options}\\n\", basename(argv[0]));")
}

impl Backend for ShellBackend {
    fn name(&self) -> &'static str {
        "Shell"
    }

    fn comment(&self, text: &str) -> String {
        format!("/* ERROR: {} */\n", text.replace("*/", "* /"))
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let ctx = FunctionContext::resolve(session.catalog(), function)?;
        let args = shell_args(&ctx);
        let chunks = FunctionChunks {
            func: function.to_string(),
            banner: format!("{function:<42}"),
            usage: chunk_usage(&args),
            decl: chunk_decl(&ctx)?,
            nargs: args.len(),
            args: chunk_args(&args),
            default: chunk_default(&ctx, &args),
            inconv: chunk_inconv(&ctx, &args)?,
            call: chunk_call(&ctx)?,
            outconv: chunk_outconv(&ctx)?,
        };
        self.engine.render("shell/function", &chunks)
    }

    fn functions_block(&mut self, session: &mut Session) -> Result<String> {
        let functions = session.generatable_functions();
        let mut out = String::from("\n/* Function prototypes first */\n\n");
        for name in &functions {
            out.push_str(&format!("int shell_{name}(int argc, char **argv);\n"));
        }

        out.push_str("\n/* The main function */\n\n");
        out.push_str("int main(int argc, char **argv) {\n\n");
        out.push_str("  const char *base=basename(argv[0]);\n\n  ");
        for name in &functions {
            out.push_str(&format!(
                "if (!strcasecmp(base, \"{name}\")) {{\n    return shell_{name}(argc, argv);\n  }} else "
            ));
        }
        out.push_str("{\n    printf(\"Unknown function, exiting\\n\");\n");
        out.push_str("  }\n\n  shell_igraph_usage(argc, argv);\n\n  return 0;\n}\n");

        out.push_str("\n/* The functions themselves at last */\n");
        for name in &functions {
            out.push_str(&render_guarded(self, session, name)?);
        }
        Ok(out)
    }
}

/// One line per generatable function name, used to create the command
/// links of the [`ShellBackend`] program (`ShellLn`).
#[derive(Debug, Default)]
pub struct ShellLinksBackend;

impl Backend for ShellLinksBackend {
    fn name(&self) -> &'static str {
        "ShellLn"
    }

    fn comment(&self, text: &str) -> String {
        format!("# {text}\n")
    }

    fn render_function(&mut self, _session: &mut Session, function: &str) -> Result<String> {
        Ok(format!("{function}\n"))
    }
}
