//! Template engine for backend skeletons using Handlebars.
//!
//! The fixed structural text of the larger backends (the R and JNI C glue
//! functions, a shell entry point, the validator's `main`) lives in `.hbs` files next to
//! this crate. Per-parameter chunks are rendered by the substitution engine
//! first and then dropped into these skeletons verbatim.
//!
//! # Examples
//!
//! ```
//! use stimulus_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let engine = TemplateEngine::new().unwrap();
//! let text = engine
//!     .render("validator/epilogue", &json!({"checks": "    check();"}))
//!     .unwrap();
//! assert!(text.contains("check();"));
//! ```

use handlebars::Handlebars;
use serde::Serialize;
use stimulus_core::{Error, Result};

/// Template engine for backend skeletons.
///
/// Runs in strict mode (a missing field is an error, not an empty string)
/// and without HTML escaping, since the output is source code.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates a new template engine with the built-in skeletons registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template does not
    /// compile.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        Self::register_builtin_templates(&mut handlebars)?;

        Ok(Self { handlebars })
    }

    fn register_builtin_templates(handlebars: &mut Handlebars<'a>) -> Result<()> {
        let builtins = [
            ("rc/function", include_str!("../templates/rc_function.c.hbs")),
            (
                "java/function",
                include_str!("../templates/java_function.c.hbs"),
            ),
            (
                "shell/function",
                include_str!("../templates/shell_function.c.hbs"),
            ),
            (
                "validator/epilogue",
                include_str!("../templates/validator_epilogue.cpp.hbs"),
            ),
        ];
        for (name, template) in builtins {
            handlebars
                .register_template_string(name, template)
                .map_err(|e| Error::TemplateError {
                    message: format!("Failed to register {name} template: {e}"),
                })?;
        }
        Ok(())
    }

    /// Renders a registered template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template is unknown or the
    /// context lacks a field it uses.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                message: format!("Rendering {template_name} failed: {e}"),
            })
    }

    /// Registers an additional template at runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template string is invalid.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                message: format!("Failed to register template '{name}': {e}"),
            })
    }
}
