//! Placeholder substitution in type templates.
//!
//! Templates know five placeholders:
//!
//! | token     | meaning                                              |
//! |-----------|------------------------------------------------------|
//! | `%T%`     | concrete type of the parameter in the target         |
//! | `%C%`     | internal (generated) variable name                   |
//! | `%I%`     | interface (user-visible) parameter name              |
//! | `%C<n>%`  | internal name of the n-th declared dependency        |
//! | `%I<n>%`  | interface name of the n-th declared dependency       |
//!
//! Any other `%` is literal text. A dependency placeholder that cannot be
//! resolved is an error rather than text left in the output.

use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;
use stimulus_core::{Error, Result};
use stimulus_model::{ParamSpec, TypeDescriptor};

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%(T|C\d*|I\d*)%").expect("valid regex"));

/// One placeholder of the template mini-language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `%T%`
    Type,
    /// `%C%`
    InternalName,
    /// `%I%`
    InterfaceName,
    /// `%C<n>%`, 1-based
    DependencyInternal(usize),
    /// `%I<n>%`, 1-based
    DependencyInterface(usize),
}

impl Placeholder {
    /// Parses a complete token such as `%I2%`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_codegen::Placeholder;
    ///
    /// assert_eq!(Placeholder::parse("%C%"), Some(Placeholder::InternalName));
    /// assert_eq!(Placeholder::parse("%I2%"), Some(Placeholder::DependencyInterface(2)));
    /// assert_eq!(Placeholder::parse("%X%"), None);
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        let caps = PLACEHOLDER_REGEX.captures(token)?;
        if caps.get(0)?.as_str() != token {
            return None;
        }
        from_captures(&caps)
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => f.write_str("%T%"),
            Self::InternalName => f.write_str("%C%"),
            Self::InterfaceName => f.write_str("%I%"),
            Self::DependencyInternal(n) => write!(f, "%C{n}%"),
            Self::DependencyInterface(n) => write!(f, "%I{n}%"),
        }
    }
}

fn from_captures(caps: &Captures<'_>) -> Option<Placeholder> {
    let inner = caps.get(1)?.as_str();
    let (kind, digits) = inner.split_at(1);
    if digits.is_empty() {
        return match kind {
            "T" => Some(Placeholder::Type),
            "C" => Some(Placeholder::InternalName),
            _ => Some(Placeholder::InterfaceName),
        };
    }
    let n = digits.parse().ok()?;
    if kind == "C" {
        Some(Placeholder::DependencyInternal(n))
    } else {
        Some(Placeholder::DependencyInterface(n))
    }
}

/// Lists the placeholders of a template in order of appearance.
///
/// Text such as `%T1%` or `%X%` is not a placeholder and is skipped.
pub fn placeholders(template: &str) -> impl Iterator<Item = Placeholder> + '_ {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .filter_map(|caps| from_captures(&caps))
}

/// Rules that turn a declared parameter name into generated names.
#[derive(Debug, Clone, Copy)]
pub struct Naming {
    internal: fn(&str) -> String,
    interface: fn(&str) -> String,
}

impl Naming {
    /// Creates naming rules from two mapping functions.
    #[must_use]
    pub const fn new(internal: fn(&str) -> String, interface: fn(&str) -> String) -> Self {
        Self {
            internal,
            interface,
        }
    }

    /// Internal variable name of a parameter.
    #[must_use]
    pub fn internal(&self, name: &str) -> String {
        (self.internal)(name)
    }

    /// Interface name of a parameter.
    #[must_use]
    pub fn interface(&self, name: &str) -> String {
        (self.interface)(name)
    }
}

impl Default for Naming {
    fn default() -> Self {
        Self::new(str::to_string, str::to_string)
    }
}

/// Values bound to the placeholders of one parameter (or of a return value).
///
/// # Examples
///
/// ```
/// use stimulus_codegen::{Naming, Substitution};
/// use stimulus_model::ParamSpec;
///
/// let mut spec = ParamSpec::new("weights", "EDGEWEIGHTS");
/// spec.dependencies = vec!["graph".to_string()];
///
/// let naming = Naming::new(|n| format!("c_{n}"), str::to_string);
/// let subst = Substitution::for_param("igraph_f", &spec, None, &naming);
///
/// assert_eq!(
///     subst.apply("convert(%I%, &%C%, %C1%)").unwrap(),
///     "convert(weights, &c_weights, c_graph)"
/// );
/// assert!(subst.apply("%I2%").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Substitution {
    function: String,
    parameter: String,
    type_name: String,
    concrete_type: String,
    internal: String,
    interface: String,
    dependencies: Vec<(String, String)>,
}

impl Substitution {
    /// Binds a value with no dependencies; both names are `name` and the
    /// concrete type is the abstract one.
    #[must_use]
    pub fn new(function: &str, name: &str, type_name: &str) -> Self {
        Self {
            function: function.to_string(),
            parameter: name.to_string(),
            type_name: type_name.to_string(),
            concrete_type: type_name.to_string(),
            internal: name.to_string(),
            interface: name.to_string(),
            dependencies: Vec::new(),
        }
    }

    /// Binds a parameter of `function`. The concrete type is the type's
    /// `CTYPE` for the parameter's mode when `ty` has one.
    #[must_use]
    pub fn for_param(
        function: &str,
        param: &ParamSpec,
        ty: Option<&TypeDescriptor>,
        naming: &Naming,
    ) -> Self {
        let concrete_type = ty
            .and_then(|t| t.c_type(param.mode))
            .unwrap_or(&param.type_name)
            .to_string();
        Self {
            function: function.to_string(),
            parameter: param.name.clone(),
            type_name: param.type_name.clone(),
            concrete_type,
            internal: naming.internal(&param.name),
            interface: naming.interface(&param.name),
            dependencies: param
                .dependencies
                .iter()
                .map(|dep| (naming.internal(dep), naming.interface(dep)))
                .collect(),
        }
    }

    /// Overrides the internal name.
    #[must_use]
    pub fn with_internal(mut self, name: impl Into<String>) -> Self {
        self.internal = name.into();
        self
    }

    /// Overrides the interface name.
    #[must_use]
    pub fn with_interface(mut self, name: impl Into<String>) -> Self {
        self.interface = name.into();
        self
    }

    /// Overrides the concrete type.
    #[must_use]
    pub fn with_concrete_type(mut self, name: impl Into<String>) -> Self {
        self.concrete_type = name.into();
        self
    }

    fn resolve(&self, placeholder: Placeholder) -> Option<&str> {
        let dependency = |n: usize| n.checked_sub(1).and_then(|i| self.dependencies.get(i));
        match placeholder {
            Placeholder::Type => Some(&self.concrete_type),
            Placeholder::InternalName => Some(&self.internal),
            Placeholder::InterfaceName => Some(&self.interface),
            Placeholder::DependencyInternal(n) => dependency(n).map(|(c, _)| c.as_str()),
            Placeholder::DependencyInterface(n) => dependency(n).map(|(_, i)| i.as_str()),
        }
    }

    /// Fills every placeholder of `template`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedPlaceholder`] for a dependency placeholder
    /// beyond the parameter's declared dependencies.
    pub fn apply(&self, template: &str) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;
        for caps in PLACEHOLDER_REGEX.captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let value = from_captures(&caps).and_then(|p| self.resolve(p));
            let Some(value) = value else {
                return Err(Error::UnresolvedPlaceholder {
                    function: self.function.clone(),
                    parameter: self.parameter.clone(),
                    type_name: self.type_name.clone(),
                    placeholder: whole.as_str().to_string(),
                });
            };
            out.push_str(&template[last..whole.start()]);
            out.push_str(value);
            last = whole.end();
        }
        out.push_str(&template[last..]);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stimulus_model::ParamMode;

    fn subst() -> Substitution {
        let mut spec = ParamSpec::new("vids", "VERTEXSET").with_mode(ParamMode::In);
        spec.dependencies = vec!["graph".to_string(), "mode".to_string()];
        Substitution::for_param("igraph_f", &spec, None, &Naming::default())
    }

    #[test]
    fn test_literal_percent_is_kept() {
        assert_eq!(subst().apply("100% of %I%").unwrap(), "100% of vids");
        assert_eq!(subst().apply("%X% %%").unwrap(), "%X% %%");
    }

    #[test]
    fn test_dependencies_resolve_positionally() {
        assert_eq!(subst().apply("f(%I1%, %C2%)").unwrap(), "f(graph, mode)");
    }

    #[test]
    fn test_unresolved_dependency_placeholder() {
        let err = subst().apply("f(%I3%)").unwrap_err();
        match err {
            Error::UnresolvedPlaceholder {
                function,
                parameter,
                type_name,
                placeholder,
            } => {
                assert_eq!(function, "igraph_f");
                assert_eq!(parameter, "vids");
                assert_eq!(type_name, "VERTEXSET");
                assert_eq!(placeholder, "%I3%");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(subst().apply("%C0%").is_err());
    }

    #[test]
    fn test_type_defaults_to_abstract_name() {
        assert_eq!(subst().apply("%T%").unwrap(), "VERTEXSET");
        let concrete = subst().with_concrete_type("igraph_vs_t");
        assert_eq!(concrete.apply("%T% %C%;").unwrap(), "igraph_vs_t vids;");
    }

    #[test]
    fn test_type_from_ctype() {
        let mut ty = TypeDescriptor::new("INT");
        ty.update_from(&stimulus_parser::parse_str("CTYPE: igraph_integer_t\n").unwrap())
            .unwrap();
        let spec = ParamSpec::new("n", "INT");
        let subst = Substitution::for_param("f", &spec, Some(&ty), &Naming::default());
        assert_eq!(subst.apply("%T% %C%;").unwrap(), "igraph_integer_t n;");
    }

    #[test]
    fn test_placeholder_listing() {
        let found: Vec<_> = placeholders("%T% %C% %I% %C1% %I2% %T1%").collect();
        assert_eq!(
            found,
            vec![
                Placeholder::Type,
                Placeholder::InternalName,
                Placeholder::InterfaceName,
                Placeholder::DependencyInternal(1),
                Placeholder::DependencyInterface(2),
            ]
        );
    }

    #[test]
    fn test_placeholder_display_round_trip() {
        for token in ["%T%", "%C%", "%I%", "%C3%", "%I1%"] {
            assert_eq!(Placeholder::parse(token).unwrap().to_string(), token);
        }
    }

    #[test]
    fn test_overrides() {
        let s = Substitution::new("f", "return", "INT")
            .with_internal("c_result")
            .with_interface("res");
        assert_eq!(s.apply("%I% <- %C%").unwrap(), "res <- c_result");
    }
}
