//! Function parameters and the per-parameter grammar.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use stimulus_core::{Error, Result};

/// Direction of a function parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ParamMode {
    /// Read by the underlying call.
    #[default]
    In,
    /// Written by the underlying call.
    Out,
    /// Read and written by the underlying call.
    InOut,
}

impl ParamMode {
    /// Keyword used in specification files and as the key of mode-keyed
    /// templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
            Self::InOut => "INOUT",
        }
    }

    /// Returns `true` for `IN` and `INOUT`.
    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    /// Returns `true` for `OUT` and `INOUT`.
    #[must_use]
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut)
    }
}

impl fmt::Display for ParamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "IN" => Ok(Self::In),
            "OUT" => Ok(Self::Out),
            "INOUT" => Ok(Self::InOut),
            other => Err(Error::InvalidArgument(format!(
                "unknown parameter mode '{other}'"
            ))),
        }
    }
}

/// One parameter of a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamSpec {
    /// Declared name, unique within the function.
    pub name: String,
    /// Abstract type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Direction.
    pub mode: ParamMode,
    /// Abstract default value, if any.
    pub default: Option<String>,
    /// Parameters this one's templates may refer to as `%I<n>%`/`%C<n>%`.
    pub dependencies: Vec<String>,
    /// Part of the simplified return surface.
    pub primary: bool,
    /// May be omitted from the simplified return surface.
    pub optional: bool,
    /// Name used in multi-output aggregates instead of `name`.
    pub output_name: Option<String>,
}

impl ParamSpec {
    /// Creates an `IN` parameter without default or dependencies.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            mode: ParamMode::In,
            default: None,
            dependencies: Vec::new(),
            primary: false,
            optional: false,
            output_name: None,
        }
    }

    /// Sets the mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ParamMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parses one item of a `PARAMS` attribute.
    ///
    /// The grammar is
    /// `[PRIMARY|OPTIONAL]* [IN|OUT|INOUT]? <type> <name> ['=' <default>]`;
    /// a missing mode means `IN`. `function` is only used for error
    /// messages.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if the item does not leave exactly
    /// a type and a name after the keywords, or has an empty default.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_model::{ParamMode, ParamSpec};
    ///
    /// let spec = ParamSpec::parse("f", "OPTIONAL OUT VECTOR res = NULL").unwrap();
    /// assert_eq!(spec.name, "res");
    /// assert_eq!(spec.type_name, "VECTOR");
    /// assert_eq!(spec.mode, ParamMode::Out);
    /// assert_eq!(spec.default.as_deref(), Some("NULL"));
    /// assert!(spec.optional);
    /// ```
    pub fn parse(function: &str, item: &str) -> Result<Self> {
        let item = item.trim();
        let invalid = |reason: &str| Error::InvalidParameter {
            function: function.to_string(),
            spec: item.to_string(),
            reason: reason.to_string(),
        };

        let (head, default) = match item.split_once('=') {
            Some((head, default)) => {
                let default = default.trim();
                if default.is_empty() {
                    return Err(invalid("empty default value"));
                }
                (head, Some(default.to_string()))
            }
            None => (item, None),
        };

        let mut tokens = head.split_whitespace().peekable();
        let (mut primary, mut optional) = (false, false);
        while let Some(token) = tokens.peek() {
            match *token {
                "PRIMARY" => primary = true,
                "OPTIONAL" => optional = true,
                _ => break,
            }
            tokens.next();
        }

        let mode = match tokens.peek().map(|t| t.parse::<ParamMode>()) {
            Some(Ok(mode)) => {
                tokens.next();
                mode
            }
            _ => ParamMode::In,
        };

        let rest: Vec<&str> = tokens.collect();
        let [type_name, name] = rest.as_slice() else {
            return Err(invalid("expected a type followed by a name"));
        };

        Ok(Self {
            name: (*name).to_string(),
            type_name: (*type_name).to_string(),
            mode,
            default,
            dependencies: Vec::new(),
            primary,
            optional,
            output_name: None,
        })
    }

    /// Returns `true` if the parameter is read by the call.
    #[must_use]
    pub const fn is_input(&self) -> bool {
        self.mode.is_input()
    }

    /// Returns `true` if the parameter is written by the call.
    #[must_use]
    pub const fn is_output(&self) -> bool {
        self.mode.is_output()
    }

    /// Name used for this parameter in multi-output aggregates.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    /// Name of the `n`-th (1-based) dependency.
    #[must_use]
    pub fn dependency(&self, n: usize) -> Option<&str> {
        n.checked_sub(1)
            .and_then(|i| self.dependencies.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults_to_in() {
        let spec = ParamSpec::parse("f", "GRAPH graph").unwrap();
        assert_eq!(spec.mode, ParamMode::In);
        assert_eq!(spec.type_name, "GRAPH");
        assert_eq!(spec.name, "graph");
        assert!(spec.default.is_none());
        assert!(!spec.primary && !spec.optional);
    }

    #[test]
    fn test_all_modes() {
        for (text, mode) in [
            ("IN INT a", ParamMode::In),
            ("OUT INT a", ParamMode::Out),
            ("INOUT INT a", ParamMode::InOut),
        ] {
            assert_eq!(ParamSpec::parse("f", text).unwrap().mode, mode);
        }
    }

    #[test]
    fn test_default_spacing_is_free() {
        for text in ["VS vids=ALL", "VS vids = ALL", "VS vids   =ALL  "] {
            let spec = ParamSpec::parse("f", text).unwrap();
            assert_eq!(spec.name, "vids");
            assert_eq!(spec.default.as_deref(), Some("ALL"));
        }
    }

    #[test]
    fn test_default_keeps_later_equals() {
        let spec = ParamSpec::parse("f", "STRING s = a=b").unwrap();
        assert_eq!(spec.default.as_deref(), Some("a=b"));
    }

    #[test]
    fn test_flags_in_any_order() {
        let spec = ParamSpec::parse("f", "OPTIONAL PRIMARY INOUT MATRIX m").unwrap();
        assert!(spec.primary);
        assert!(spec.optional);
        assert_eq!(spec.mode, ParamMode::InOut);
    }

    #[test]
    fn test_lowercase_mode_is_a_type() {
        // unknown leading tokens start the type
        let err = ParamSpec::parse("f", "out INT a").unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { .. }));
    }

    #[test]
    fn test_continuation_whitespace_ignored() {
        let spec = ParamSpec::parse("f", "\n  NEIMODE mode=ALL").unwrap();
        assert_eq!(spec.type_name, "NEIMODE");
        assert_eq!(spec.name, "mode");
    }

    #[test]
    fn test_invalid_items() {
        for text in ["INT", "OUT", "INT a b", "INT a =", "= 3"] {
            let err = ParamSpec::parse("igraph_f", text).unwrap_err();
            assert!(
                matches!(&err, Error::InvalidParameter { function, .. } if function == "igraph_f"),
                "{text:?} gave {err}"
            );
        }
    }

    #[test]
    fn test_predicates_and_display_name() {
        let mut spec = ParamSpec::new("res", "VECTOR").with_mode(ParamMode::InOut);
        assert!(spec.is_input());
        assert!(spec.is_output());
        assert_eq!(spec.display_name(), "res");
        spec.output_name = Some("result".to_string());
        assert_eq!(spec.display_name(), "result");
    }

    #[test]
    fn test_dependency_lookup_is_one_based() {
        let mut spec = ParamSpec::new("weights", "EDGEWEIGHTS");
        spec.dependencies = vec!["graph".to_string(), "vids".to_string()];
        assert_eq!(spec.dependency(1), Some("graph"));
        assert_eq!(spec.dependency(2), Some("vids"));
        assert_eq!(spec.dependency(0), None);
        assert_eq!(spec.dependency(3), None);
    }

    #[test]
    fn test_mode_keyword_round_trip() {
        for mode in [ParamMode::In, ParamMode::Out, ParamMode::InOut] {
            assert_eq!(mode.as_str().parse::<ParamMode>().unwrap(), mode);
        }
    }
}
