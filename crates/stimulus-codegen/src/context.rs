//! Resolved view of one function, shared by every backend renderer.

use crate::substitute::{Naming, Substitution};
use stimulus_core::{Error, Result};
use stimulus_model::{Catalog, Facet, FunctionDescriptor, ParamSpec, TypeDescriptor};

/// A parameter together with its resolved type.
#[derive(Debug, Clone, Copy)]
pub struct Param<'a> {
    /// The parameter.
    pub spec: &'a ParamSpec,
    /// Its type descriptor.
    pub ty: &'a TypeDescriptor,
}

impl<'a> Param<'a> {
    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.spec.name
    }
}

/// How a function hands back its result.
#[derive(Debug, Clone)]
pub enum ResultShape<'a> {
    /// No output parameters: the function's return value is the result.
    ReturnValue,
    /// One output parameter is the result.
    Single(Param<'a>),
    /// Several outputs, packed into an aggregate keyed by display name.
    Aggregate(Vec<Param<'a>>),
}

impl<'a> ResultShape<'a> {
    /// Classifies the outputs among `params`, keeping their order.
    #[must_use]
    pub fn from_params(params: &[Param<'a>]) -> Self {
        let mut outputs: Vec<Param<'a>> = params
            .iter()
            .filter(|p| p.spec.is_output())
            .copied()
            .collect();
        match outputs.len() {
            0 => Self::ReturnValue,
            1 => Self::Single(outputs.remove(0)),
            _ => Self::Aggregate(outputs),
        }
    }

    /// Number of output parameters.
    #[must_use]
    pub fn output_count(&self) -> usize {
        match self {
            Self::ReturnValue => 0,
            Self::Single(_) => 1,
            Self::Aggregate(outputs) => outputs.len(),
        }
    }

    /// Keys of the aggregate, in order; empty for the other shapes.
    #[must_use]
    pub fn keys(&self) -> Vec<&'a str> {
        match self {
            Self::Aggregate(outputs) => outputs.iter().map(|p| p.spec.display_name()).collect(),
            Self::ReturnValue | Self::Single(_) => Vec::new(),
        }
    }

    /// For backends without aggregates: the single output, or `None` when
    /// the return value is the result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMultiOutput`] for an aggregate.
    pub fn single(self, function: &str) -> Result<Option<Param<'a>>> {
        match self {
            Self::ReturnValue => Ok(None),
            Self::Single(param) => Ok(Some(param)),
            Self::Aggregate(outputs) => Err(Error::UnsupportedMultiOutput {
                function: function.to_string(),
                count: outputs.len(),
            }),
        }
    }
}

/// A function whose parameter and return types all resolved.
///
/// # Examples
///
/// ```
/// use stimulus_codegen::{FunctionContext, ResultShape};
/// use stimulus_model::Catalog;
/// use stimulus_parser::parse_str;
///
/// let mut catalog = Catalog::new();
/// catalog
///     .load_functions(&parse_str("f:\n    PARAMS: IN INT a, OUT DOUBLE b\n").unwrap())
///     .unwrap();
/// catalog
///     .load_types(&parse_str("INT:\nDOUBLE:\nERROR:\n").unwrap())
///     .unwrap();
///
/// let ctx = FunctionContext::resolve(&catalog, "f").unwrap();
/// assert!(matches!(ctx.shape(), ResultShape::Single(p) if p.name() == "b"));
/// ```
#[derive(Debug)]
pub struct FunctionContext<'a> {
    descriptor: &'a FunctionDescriptor,
    params: Vec<Param<'a>>,
    ordered: Vec<Param<'a>>,
    return_type: &'a TypeDescriptor,
}

impl<'a> FunctionContext<'a> {
    /// Resolves every type `name` refers to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] for the first parameter or return type
    /// missing from the catalog, [`Error::InvalidArgument`] for an unknown
    /// function, and the derivation errors of the descriptor.
    pub fn resolve(catalog: &'a Catalog, name: &str) -> Result<Self> {
        let descriptor = catalog
            .function(name)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown function '{name}'")))?;

        let params = descriptor
            .parameters()?
            .values()
            .map(|spec| {
                Ok(Param {
                    spec,
                    ty: catalog.resolve_type(name, &spec.type_name)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let return_type = catalog.resolve_type(name, descriptor.return_type())?;

        let ordered = descriptor
            .param_order()?
            .iter()
            .filter_map(|n| params.iter().find(|p| p.name() == n.as_str()).copied())
            .collect();

        Ok(Self {
            descriptor,
            params,
            ordered,
            return_type,
        })
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.descriptor.name()
    }

    /// The underlying descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &'a FunctionDescriptor {
        self.descriptor
    }

    /// Parameters in declaration order (the order of the underlying call).
    #[must_use]
    pub fn params(&self) -> &[Param<'a>] {
        &self.params
    }

    /// Parameters in signature order (`PARAM_ORDER` applied).
    #[must_use]
    pub fn ordered(&self) -> &[Param<'a>] {
        &self.ordered
    }

    /// Type of the return value.
    #[must_use]
    pub const fn return_type(&self) -> &'a TypeDescriptor {
        self.return_type
    }

    /// Result shape over the signature order.
    #[must_use]
    pub fn shape(&self) -> ResultShape<'a> {
        ResultShape::from_params(&self.ordered)
    }

    /// Placeholder bindings of `param` under `naming`.
    #[must_use]
    pub fn substitution(&self, param: Param<'_>, naming: &Naming) -> Substitution {
        Substitution::for_param(self.name(), param.spec, Some(param.ty), naming)
    }

    /// Renders the `facet` template of `param`.
    ///
    /// `None` means the type does not define the facet for the parameter's
    /// mode; an empty string means it explicitly opts out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedPlaceholder`] if the template refers to an
    /// undeclared dependency.
    pub fn render(&self, param: Param<'_>, facet: Facet, naming: &Naming) -> Result<Option<String>> {
        param
            .ty
            .template(facet, param.spec.mode)
            .map(|template| self.substitution(param, naming).apply(template))
            .transpose()
    }

    /// Renders `facet` for every parameter of `params` that defines it and
    /// does not opt out.
    ///
    /// # Errors
    ///
    /// Returns the first substitution error.
    pub fn render_all(
        &self,
        params: &[Param<'_>],
        facet: Facet,
        naming: &Naming,
    ) -> Result<Vec<String>> {
        let mut out = Vec::new();
        for &param in params {
            if let Some(text) = self.render(param, facet, naming)?
                && !text.is_empty()
            {
                out.push(text);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stimulus_parser::parse_str;

    fn catalog(functions: &str, types: &str) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.load_functions(&parse_str(functions).unwrap()).unwrap();
        catalog.load_types(&parse_str(types).unwrap()).unwrap();
        catalog
    }

    const TYPES: &str = "INT:\n    INCONV: check(%I%)\nDOUBLE:\nERROR:\n";

    #[test]
    fn test_unknown_parameter_type() {
        let c = catalog("f:\n    PARAMS: GRAPH g\n", TYPES);
        let err = FunctionContext::resolve(&c, "f").unwrap_err();
        assert!(matches!(err, Error::UnknownType { ref type_name, .. } if type_name == "GRAPH"));
    }

    #[test]
    fn test_unknown_return_type() {
        let c = catalog("f:\n    RETURN: BOOL\n", TYPES);
        let err = FunctionContext::resolve(&c, "f").unwrap_err();
        assert!(err.is_per_function());
    }

    #[test]
    fn test_shapes() {
        let c = catalog(
            "none:\n    PARAMS: INT a\nmany:\n    PARAMS: OUT INT x, INT a, INOUT DOUBLE y\n",
            TYPES,
        );
        let none = FunctionContext::resolve(&c, "none").unwrap();
        assert!(matches!(none.shape(), ResultShape::ReturnValue));
        assert_eq!(none.shape().output_count(), 0);

        let many = FunctionContext::resolve(&c, "many").unwrap();
        assert_eq!(many.shape().keys(), vec!["x", "y"]);
        let err = many.shape().single("many").unwrap_err();
        assert!(matches!(err, Error::UnsupportedMultiOutput { count: 2, .. }));
    }

    #[test]
    fn test_aggregate_follows_signature_order_and_names() {
        let c = catalog(
            "f:\n    PARAMS: OUT INT x, OUT INT y\n    PARAM_ORDER: y, ...\n    PARAM_NAMES: x = first\n",
            TYPES,
        );
        let ctx = FunctionContext::resolve(&c, "f").unwrap();
        assert_eq!(ctx.shape().keys(), vec!["y", "first"]);
        let declared: Vec<_> = ctx.params().iter().map(Param::name).collect();
        assert_eq!(declared, vec!["x", "y"]);
    }

    #[test]
    fn test_render_all_skips_missing_facets() {
        let c = catalog("f:\n    PARAMS: INT a, DOUBLE b, OUT INT c\n", TYPES);
        let ctx = FunctionContext::resolve(&c, "f").unwrap();
        let checks = ctx
            .render_all(ctx.params(), Facet::InConv, &Naming::default())
            .unwrap();
        assert_eq!(checks, vec!["check(a)"]);
    }
}
