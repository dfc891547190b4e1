//! Catalog of every function and type known to one generation job.

use crate::function::FunctionDescriptor;
use crate::types::TypeDescriptor;
use indexmap::IndexMap;
use std::path::Path;
use stimulus_core::{Error, GeneratorConfig, Result};
use stimulus_parser::{AttrMap, AttrValue, load_file};

/// Ordered function and type descriptors accumulated from spec sources.
///
/// Descriptors are created on first mention and merged on every later one.
/// Iteration follows first-mention order.
///
/// # Examples
///
/// ```
/// use stimulus_model::Catalog;
/// use stimulus_parser::parse_str;
///
/// let mut catalog = Catalog::new();
/// catalog
///     .load_functions(&parse_str("f:\n    PARAMS: INT a\ng:\n").unwrap())
///     .unwrap();
/// catalog
///     .load_types(&parse_str("INT:\n    CALL: %C%\n").unwrap())
///     .unwrap();
///
/// let names: Vec<_> = catalog.functions().map(|f| f.name()).collect();
/// assert_eq!(names, vec!["f", "g"]);
/// assert!(catalog.type_descriptor("INT").is_some());
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    functions: IndexMap<String, FunctionDescriptor>,
    types: IndexMap<String, TypeDescriptor>,
    lenient_dependencies: bool,
}

impl Catalog {
    /// Creates an empty catalog with strict dependency checking.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty catalog honouring the configuration's dependency
    /// policy.
    #[must_use]
    pub fn with_config(config: &GeneratorConfig) -> Self {
        Self {
            lenient_dependencies: !config.strict_dependencies,
            ..Self::default()
        }
    }

    /// Merges a function tree (function name to attribute mapping).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] if an entry is not a mapping or
    /// one of its attributes has the wrong shape.
    pub fn load_functions(&mut self, tree: &AttrMap) -> Result<()> {
        for (name, value) in tree {
            let attrs = entry_attrs(name, value)?;
            let strict = !self.lenient_dependencies;
            self.functions
                .entry(name.clone())
                .or_insert_with(|| {
                    FunctionDescriptor::new(name.clone()).with_strict_dependencies(strict)
                })
                .update_from(attrs)?;
        }
        Ok(())
    }

    /// Merges a type tree (type name to attribute mapping).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] if an entry is not a mapping or
    /// its `FLAGS` has the wrong shape.
    pub fn load_types(&mut self, tree: &AttrMap) -> Result<()> {
        for (name, value) in tree {
            let attrs = entry_attrs(name, value)?;
            self.types
                .entry(name.clone())
                .or_insert_with(|| TypeDescriptor::new(name.clone()))
                .update_from(attrs)?;
        }
        Ok(())
    }

    /// Loads and merges a function specification file.
    ///
    /// # Errors
    ///
    /// Returns the I/O or parse error of the file, or the merge error of
    /// [`Catalog::load_functions`].
    pub fn load_function_file(&mut self, path: &Path) -> Result<()> {
        let tree = load_file(path)?;
        self.load_functions(&tree)?;
        tracing::debug!(
            "Loaded {} function(s) from {}",
            tree.len(),
            path.display()
        );
        Ok(())
    }

    /// Loads and merges a type specification file.
    ///
    /// # Errors
    ///
    /// Returns the I/O or parse error of the file, or the merge error of
    /// [`Catalog::load_types`].
    pub fn load_type_file(&mut self, path: &Path) -> Result<()> {
        let tree = load_file(path)?;
        self.load_types(&tree)?;
        tracing::debug!("Loaded {} type(s) from {}", tree.len(), path.display());
        Ok(())
    }

    /// Looks up a function.
    #[must_use]
    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    /// Looks up a type.
    #[must_use]
    pub fn type_descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Looks up a type referenced by `function`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] if the type is not in the catalog.
    pub fn resolve_type(&self, function: &str, type_name: &str) -> Result<&TypeDescriptor> {
        self.types.get(type_name).ok_or_else(|| Error::UnknownType {
            function: function.to_string(),
            type_name: type_name.to_string(),
        })
    }

    /// Functions in first-mention order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.functions.values()
    }

    /// Types in first-mention order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Number of functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Number of types.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Derives the parameters and signature order of every function, so that
    /// grammar errors surface before any output is produced.
    ///
    /// # Errors
    ///
    /// Returns the first derivation error.
    pub fn validate(&self) -> Result<()> {
        for function in self.functions.values() {
            function.param_order()?;
        }
        Ok(())
    }
}

fn entry_attrs<'a>(name: &str, value: &'a AttrValue) -> Result<&'a AttrMap> {
    value.as_map().ok_or_else(|| Error::InvalidDescriptor {
        name: name.to_string(),
        reason: format!("expected a mapping of attributes, found {}", value.kind()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stimulus_parser::parse_str;

    #[test]
    fn test_merge_across_sources_keeps_first_mention_order() {
        let mut catalog = Catalog::new();
        catalog
            .load_functions(&parse_str("b:\n    PARAMS: INT x\na:\n").unwrap())
            .unwrap();
        catalog
            .load_functions(&parse_str("c:\nb:\n    IGNORE: RR\n").unwrap())
            .unwrap();

        let names: Vec<_> = catalog.functions().map(FunctionDescriptor::name).collect();
        assert_eq!(names, vec!["b", "a", "c"]);

        let b = catalog.function("b").unwrap();
        assert!(b.is_ignored_by("RR"));
        assert_eq!(b.parameters().unwrap().len(), 1);
    }

    #[test]
    fn test_second_params_replace_first() {
        let mut catalog = Catalog::new();
        catalog
            .load_functions(&parse_str("f:\n    PARAMS: INT a, INT b\n    NAME-R: x\n").unwrap())
            .unwrap();
        catalog
            .load_functions(&parse_str("f:\n    PARAMS: OUT REAL z\n").unwrap())
            .unwrap();

        let f = catalog.function("f").unwrap();
        let names: Vec<_> = f.parameters().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["z"]);
        assert_eq!(f.raw_text("NAME-R"), Some("x"));
    }

    #[test]
    fn test_text_entry_rejected() {
        let mut catalog = Catalog::new();
        let err = catalog.load_functions(&parse_str("f: oops\n").unwrap()).unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_resolve_type() {
        let mut catalog = Catalog::new();
        catalog.load_types(&parse_str("INT:\n").unwrap()).unwrap();
        assert!(catalog.resolve_type("f", "INT").is_ok());
        let err = catalog.resolve_type("f", "GRAPH").unwrap_err();
        assert!(err.is_per_function());
    }

    #[test]
    fn test_type_key_list_shares_templates() {
        let mut catalog = Catalog::new();
        catalog
            .load_types(
                &parse_str("INT, REAL:\n    CTYPE: igraph_real_t\n    CALL: &%C%\nBOOL:\n").unwrap(),
            )
            .unwrap();

        assert_eq!(catalog.type_count(), 3);
        for name in ["INT", "REAL"] {
            let ty = catalog.resolve_type("f", name).unwrap();
            assert_eq!(ty.c_type(crate::ParamMode::In), Some("igraph_real_t"));
            assert_eq!(ty.raw_text("CALL"), Some("&%C%"));
        }
        assert_eq!(catalog.resolve_type("f", "BOOL").unwrap().raw_text("CTYPE"), None);
    }

    #[test]
    fn test_validate_surfaces_grammar_errors() {
        let mut catalog = Catalog::new();
        catalog
            .load_functions(&parse_str("f:\n    PARAMS: INT a\n    DEPS: a ON b\n").unwrap())
            .unwrap();
        let err = catalog.validate().unwrap_err();
        assert!(matches!(err, Error::UnresolvedDependency { .. }));
    }

    #[test]
    fn test_lenient_config() {
        let config = GeneratorConfig::builder().strict_dependencies(false).build();
        let mut catalog = Catalog::with_config(&config);
        catalog
            .load_functions(&parse_str("f:\n    PARAMS: INT a\n    DEPS: a ON b\n").unwrap())
            .unwrap();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.function_count(), 1);
    }
}
