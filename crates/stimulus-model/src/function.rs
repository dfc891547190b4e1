//! Function descriptors.

use crate::grammar::{
    list_items, parse_bool, parse_dependencies, parse_param_names, parse_params,
    resolve_param_order,
};
use crate::param::ParamSpec;
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;
use stimulus_core::{Error, Result};
use stimulus_parser::{AttrMap, AttrValue, deep_merge};

/// Attribute holding the parameter declarations.
pub const PARAMS: &str = "PARAMS";
/// Attribute holding the dependency declarations.
pub const DEPS: &str = "DEPS";
/// Attribute holding aggregate display-name overrides.
pub const PARAM_NAMES: &str = "PARAM_NAMES";
/// Attribute holding the signature order.
pub const PARAM_ORDER: &str = "PARAM_ORDER";

const RETURN: &str = "RETURN";
const IGNORE: &str = "IGNORE";
const FLAGS: &str = "FLAGS";
const INTERNAL: &str = "INTERNAL";

/// Return type of functions that do not declare one.
pub const DEFAULT_RETURN_TYPE: &str = "ERROR";

/// Accumulated description of one function.
///
/// The raw attributes are merged from every source that mentions the
/// function. The parameter map and signature order are derived from them on
/// first access and cached until a later merge rewrites the attributes they
/// come from.
///
/// # Examples
///
/// ```
/// use stimulus_model::FunctionDescriptor;
/// use stimulus_parser::parse_str;
///
/// let tree = parse_str("PARAMS: GRAPH graph, OUT INT res\nIGNORE: RR, RC\n").unwrap();
///
/// let mut f = FunctionDescriptor::new("igraph_f");
/// f.update_from(&tree).unwrap();
///
/// assert_eq!(f.return_type(), "ERROR");
/// assert!(f.is_ignored_by("RR"));
/// assert_eq!(f.parameters().unwrap().len(), 2);
/// ```
#[derive(Debug)]
pub struct FunctionDescriptor {
    name: String,
    attrs: AttrMap,
    return_type: String,
    flags: BTreeSet<String>,
    ignored_by: BTreeSet<String>,
    strict_dependencies: bool,
    parameters: OnceLock<IndexMap<String, ParamSpec>>,
    param_order: OnceLock<Vec<String>>,
}

impl FunctionDescriptor {
    /// Creates an empty descriptor that treats unresolved dependencies as
    /// errors.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: AttrMap::new(),
            return_type: DEFAULT_RETURN_TYPE.to_string(),
            flags: BTreeSet::new(),
            ignored_by: BTreeSet::new(),
            strict_dependencies: true,
            parameters: OnceLock::new(),
            param_order: OnceLock::new(),
        }
    }

    /// Chooses whether a `DEPS` reference to an unknown parameter is an error
    /// or is dropped with a warning.
    #[must_use]
    pub fn with_strict_dependencies(mut self, strict: bool) -> Self {
        self.strict_dependencies = strict;
        self.invalidate_parameters();
        self
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw attribute value.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// Raw attribute value, if it is text.
    #[must_use]
    pub fn raw_text(&self, key: &str) -> Option<&str> {
        self.raw(key).and_then(AttrValue::as_text)
    }

    /// All raw attributes in declaration order.
    #[must_use]
    pub const fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Abstract return type.
    #[must_use]
    pub fn return_type(&self) -> &str {
        &self.return_type
    }

    /// Lower-cased flags.
    #[must_use]
    pub const fn flags(&self) -> &BTreeSet<String> {
        &self.flags
    }

    /// Case-insensitive flag check.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(&flag.to_lowercase())
    }

    /// Whether the function is left out of public interfaces.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        self.has_flag("internal")
    }

    /// Names of the backends that skip this function.
    #[must_use]
    pub const fn ignored_by(&self) -> &BTreeSet<String> {
        &self.ignored_by
    }

    /// Whether the backend named `backend` skips this function.
    #[must_use]
    pub fn is_ignored_by(&self, backend: &str) -> bool {
        self.ignored_by.contains(backend)
    }

    /// Merges attributes from another source into this descriptor.
    ///
    /// - `PARAMS`, `DEPS`, `PARAM_NAMES` and `PARAM_ORDER` replace the stored
    ///   value wholesale and invalidate the derived views.
    /// - `IGNORE` and `FLAGS` are unioned into the backend and flag sets;
    ///   flags are lower-cased.
    /// - `INTERNAL` adds or removes the `internal` flag.
    /// - `RETURN` replaces the return type and is not kept as an attribute.
    /// - Everything else is deep-merged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDescriptor`] if one of the keys above has a
    /// shape it cannot take (for instance a mapping for `IGNORE`).
    pub fn update_from(&mut self, attrs: &AttrMap) -> Result<()> {
        let mut rest = AttrMap::new();
        for (key, value) in attrs {
            match key.as_str() {
                PARAMS | DEPS | PARAM_NAMES => {
                    self.attrs.insert(key.clone(), value.clone());
                    self.invalidate_parameters();
                }
                PARAM_ORDER => {
                    self.attrs.insert(key.clone(), value.clone());
                    self.param_order.take();
                }
                IGNORE => {
                    let backends = list_items(&self.name, key, value)?;
                    self.ignored_by.extend(backends);
                }
                FLAGS => {
                    let flags = list_items(&self.name, key, value)?;
                    self.flags.extend(flags.iter().map(|f| f.to_lowercase()));
                }
                INTERNAL => {
                    if parse_bool(&self.name, key, value)? {
                        self.flags.insert("internal".to_string());
                    } else {
                        self.flags.remove("internal");
                    }
                }
                RETURN => self.set_return_type(value)?,
                _ => {
                    rest.insert(key.clone(), value.clone());
                }
            }
        }
        deep_merge(&mut self.attrs, &rest);
        Ok(())
    }

    fn set_return_type(&mut self, value: &AttrValue) -> Result<()> {
        match value {
            AttrValue::Text(text) => {
                if !text.trim().is_empty() {
                    self.return_type = text.trim().to_string();
                }
                Ok(())
            }
            AttrValue::Map(map) if map.is_empty() => Ok(()),
            other => Err(Error::InvalidDescriptor {
                name: self.name.clone(),
                reason: format!("RETURN must be a type name, found a {}", other.kind()),
            }),
        }
    }

    fn invalidate_parameters(&mut self) {
        self.parameters.take();
        self.param_order.take();
    }

    /// Parameters in declaration order, with dependencies and display names
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns the grammar error of a malformed `PARAMS`, `DEPS` or
    /// `PARAM_NAMES` entry, [`Error::UnresolvedDependency`] for a dependency
    /// on an unknown parameter (unless dependencies are lenient), and
    /// [`Error::UnknownParameter`] for a `PARAM_NAMES` override of an
    /// unknown parameter.
    pub fn parameters(&self) -> Result<&IndexMap<String, ParamSpec>> {
        if let Some(params) = self.parameters.get() {
            return Ok(params);
        }
        let derived = self.derive_parameters()?;
        Ok(self.parameters.get_or_init(|| derived))
    }

    /// Looks up one parameter.
    ///
    /// # Errors
    ///
    /// Same as [`FunctionDescriptor::parameters`].
    pub fn parameter(&self, name: &str) -> Result<Option<&ParamSpec>> {
        Ok(self.parameters()?.get(name))
    }

    /// Parameter names in signature order.
    ///
    /// # Errors
    ///
    /// Same as [`FunctionDescriptor::parameters`], plus
    /// [`Error::DuplicateOrderEntry`] and [`Error::UnknownOrderEntry`] for a
    /// bad `PARAM_ORDER`.
    pub fn param_order(&self) -> Result<&[String]> {
        if let Some(order) = self.param_order.get() {
            return Ok(order);
        }
        let params = self.parameters()?;
        let derived = match self.attrs.get(PARAM_ORDER) {
            Some(value) => resolve_param_order(&self.name, value, params)?,
            None => params.keys().cloned().collect(),
        };
        Ok(self.param_order.get_or_init(|| derived))
    }

    /// Parameters in signature order.
    ///
    /// # Errors
    ///
    /// Same as [`FunctionDescriptor::param_order`].
    pub fn ordered_parameters(&self) -> Result<Vec<&ParamSpec>> {
        let params = self.parameters()?;
        Ok(self
            .param_order()?
            .iter()
            .filter_map(|name| params.get(name))
            .collect())
    }

    fn derive_parameters(&self) -> Result<IndexMap<String, ParamSpec>> {
        let mut params = match self.attrs.get(PARAMS) {
            Some(value) => parse_params(&self.name, value)?,
            None => IndexMap::new(),
        };

        if let Some(value) = self.attrs.get(DEPS) {
            for dep in parse_dependencies(&self.name, value)? {
                self.attach_dependency(&mut params, &dep.parameter, dep.on)?;
            }
        }

        if let Some(value) = self.attrs.get(PARAM_NAMES) {
            for (param, display) in parse_param_names(&self.name, value)? {
                let Some(spec) = params.get_mut(&param) else {
                    return Err(Error::UnknownParameter {
                        function: self.name.clone(),
                        attribute: PARAM_NAMES.to_string(),
                        parameter: param,
                    });
                };
                spec.output_name = Some(display);
            }
        }

        tracing::debug!(
            "Derived {} parameter(s) for function {}",
            params.len(),
            self.name
        );
        Ok(params)
    }

    fn attach_dependency(
        &self,
        params: &mut IndexMap<String, ParamSpec>,
        parameter: &str,
        on: Vec<String>,
    ) -> Result<()> {
        if !params.contains_key(parameter) {
            if self.strict_dependencies {
                return Err(Error::UnknownParameter {
                    function: self.name.clone(),
                    attribute: DEPS.to_string(),
                    parameter: parameter.to_string(),
                });
            }
            tracing::warn!(
                "Dependency declared on unknown parameter '{}' of function '{}'",
                parameter,
                self.name
            );
            return Ok(());
        }

        let mut resolved = Vec::with_capacity(on.len());
        for dependency in on {
            if params.contains_key(&dependency) {
                resolved.push(dependency);
            } else if self.strict_dependencies {
                return Err(Error::UnresolvedDependency {
                    function: self.name.clone(),
                    parameter: parameter.to_string(),
                    dependency,
                });
            } else {
                tracing::warn!(
                    "Dropping dependency '{}' of parameter '{}' in function '{}': no such parameter",
                    dependency,
                    parameter,
                    self.name
                );
            }
        }

        if let Some(spec) = params.get_mut(parameter) {
            spec.dependencies.extend(resolved);
        }
        Ok(())
    }
}
