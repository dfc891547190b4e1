//! Backends that inspect the catalog instead of producing bindings.

use crate::backend::{Backend, InputFile, render_functions, verbatim};
use crate::session::Session;
use crate::template_engine::TemplateEngine;
use serde_json::json;
use std::collections::BTreeMap;
use stimulus_core::Result;
use stimulus_model::ParamMode;

/// Counts how often every abstract type is used by the generated functions,
/// as parameter or return type (`DebugListTypes`).
///
/// The functions block is one `TYPE count` line per type, sorted by name.
#[derive(Debug, Default)]
pub struct ListTypesBackend {
    counts: BTreeMap<String, usize>,
}

impl ListTypesBackend {
    /// Creates the backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for ListTypesBackend {
    fn name(&self) -> &'static str {
        "DebugListTypes"
    }

    fn comment(&self, text: &str) -> String {
        format!("# {text}\n")
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let descriptor = session.function(function)?;
        for param in descriptor.parameters()?.values() {
            *self.counts.entry(param.type_name.clone()).or_default() += 1;
        }
        *self
            .counts
            .entry(descriptor.return_type().to_string())
            .or_default() += 1;
        Ok(String::new())
    }

    fn functions_block(&mut self, session: &mut Session) -> Result<String> {
        let mut out = render_functions(self, session)?;
        for (type_name, count) in &self.counts {
            out.push_str(&format!("{type_name} {count}\n"));
        }
        Ok(out)
    }
}

/// C++ source that checks the declared prototypes against the library
/// headers at compile time (`DebugValidateFunctions`).
#[derive(Debug)]
pub struct ValidatorBackend {
    engine: TemplateEngine<'static>,
    functions: Vec<String>,
}

impl ValidatorBackend {
    /// Creates the backend.
    ///
    /// # Errors
    ///
    /// Returns [`stimulus_core::Error::TemplateError`] if the skeleton does
    /// not compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            engine: TemplateEngine::new()?,
            functions: Vec::new(),
        })
    }
}

impl Backend for ValidatorBackend {
    fn name(&self) -> &'static str {
        "DebugValidateFunctions"
    }

    fn comment(&self, text: &str) -> String {
        format!("// {}\n", text.replace('\n', " "))
    }

    fn preamble(&mut self, _session: &mut Session, inputs: &[InputFile]) -> Result<String> {
        let mut out = String::from("#include <igraph.h>\n\n#include <cstdio>\n#include <type_traits>\n\n");
        out.push_str(&verbatim(inputs));
        Ok(out)
    }

    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String> {
        let catalog = session.catalog();
        let descriptor = session.function(function)?;
        let return_type = catalog.resolve_type(function, descriptor.return_type())?;

        let mut args = Vec::new();
        for param in descriptor.parameters()?.values() {
            let ty = catalog.resolve_type(function, &param.type_name)?;
            args.push(
                ty.c_type(param.mode)
                    .map_or_else(|| param.name.clone(), |c| format!("{c} {}", param.name)),
            );
        }

        self.functions.push(function.to_string());
        Ok(format!(
            "{} generated_{function}({});\n",
            return_type
                .c_type(ParamMode::Out)
                .unwrap_or_else(|| return_type.name()),
            args.join(", ")
        ))
    }

    fn epilogue(&mut self, session: &mut Session, inputs: &[InputFile]) -> Result<String> {
        let checks = self
            .functions
            .iter()
            .map(|name| {
                format!(
                    "static_assert(\n    std::is_same<\n        decltype({name}),\n        decltype(generated_{name})\n    >::value,\n    \"{name} prototype mismatch\"\n);"
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let checks = session.indent().apply(&checks);
        let mut out = self.engine.render("validator/epilogue", &json!({ "checks": checks }))?;
        out.push_str(&verbatim(inputs));
        Ok(out)
    }
}
