//! State of one generation job.

use crate::indent::Indent;
use crate::report::Diagnostic;
use std::collections::HashMap;
use stimulus_core::{BackendName, Error, GeneratorConfig, Result};
use stimulus_model::{Catalog, FunctionDescriptor};

/// Everything one (backend, output) job works on: its own catalog, the
/// memoized ignore decisions and the diagnostics collected so far.
///
/// # Examples
///
/// ```
/// use stimulus_codegen::Session;
/// use stimulus_core::GeneratorConfig;
/// use stimulus_model::Catalog;
/// use stimulus_parser::parse_str;
///
/// let mut catalog = Catalog::new();
/// catalog
///     .load_functions(&parse_str("f:\ng:\n    IGNORE: RR, RC\n").unwrap())
///     .unwrap();
///
/// let mut session = Session::new(catalog, "RR", GeneratorConfig::default());
/// assert_eq!(session.generatable_functions(), vec!["f".to_string()]);
/// ```
#[derive(Debug)]
pub struct Session {
    catalog: Catalog,
    backend: BackendName,
    config: GeneratorConfig,
    ignore_cache: HashMap<String, bool>,
    diagnostics: Vec<Diagnostic>,
}

impl Session {
    /// Creates a session for `backend` over `catalog`.
    pub fn new(catalog: Catalog, backend: impl Into<BackendName>, config: GeneratorConfig) -> Self {
        Self {
            catalog,
            backend: backend.into(),
            config,
            ignore_cache: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The job's catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Mutable access to the job's catalog.
    ///
    /// Ignore decisions already taken are not revisited.
    pub const fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Name of the backend the job runs for.
    #[must_use]
    pub const fn backend(&self) -> &BackendName {
        &self.backend
    }

    /// Job configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Indenter for nested generated lines.
    #[must_use]
    pub fn indent(&self) -> Indent {
        Indent::new(self.config.indent.clone())
    }

    /// Looks up a function of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the function is unknown.
    pub fn function(&self, name: &str) -> Result<&FunctionDescriptor> {
        self.catalog
            .function(name)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown function '{name}'")))
    }

    /// Whether the job's backend skips `function`.
    ///
    /// The answer is computed once per function name and then reused for
    /// the rest of the job. Unknown functions are ignored.
    pub fn should_ignore(&mut self, function: &str) -> bool {
        if let Some(&ignored) = self.ignore_cache.get(function) {
            return ignored;
        }
        let ignored = self
            .catalog
            .function(function)
            .is_none_or(|f| f.is_ignored_by(self.backend.as_str()));
        if ignored {
            tracing::debug!("{} ignores function {function}", self.backend);
        }
        self.ignore_cache.insert(function.to_string(), ignored);
        ignored
    }

    /// Names of the functions the backend generates, in catalog order.
    pub fn generatable_functions(&mut self) -> Vec<String> {
        let names: Vec<String> = self
            .catalog
            .functions()
            .map(|f| f.name().to_string())
            .collect();
        names
            .into_iter()
            .filter(|name| !self.should_ignore(name))
            .collect()
    }

    /// Records a per-function problem.
    pub fn record(&mut self, function: &str, error: &Error) {
        tracing::warn!("{function}: {error}");
        self.diagnostics.push(Diagnostic::new(function, error.to_string()));
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the session, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
