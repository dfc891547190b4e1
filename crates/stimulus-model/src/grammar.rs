//! Grammars of the list-valued function attributes.
//!
//! - `DEPS`: `<param> ON <dep1> <dep2> ..., <param> ON ...`
//! - `PARAM_NAMES`: `<param> = <display>, ...` or a mapping
//! - `PARAM_ORDER`: `<param>, ..., ...` with at most one `...`
//!
//! `IGNORE`, `FLAGS` and `PARAMS` are plain comma-separated lists (or YAML
//! lists) and go through [`list_items`].

use crate::param::ParamSpec;
use indexmap::{IndexMap, IndexSet};
use stimulus_core::{Error, Result};
use stimulus_parser::AttrValue;

/// Placeholder in `PARAM_ORDER` standing for every parameter not listed.
pub const ORDER_ELLIPSIS: &str = "...";

/// One `DEPS` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Parameter that declares the dependencies.
    pub parameter: String,
    /// Parameters it depends on, in declaration order.
    pub on: Vec<String>,
}

/// Splits a list-valued attribute into trimmed, non-empty items.
///
/// # Errors
///
/// Returns [`Error::InvalidDescriptor`] if the value is a non-empty mapping.
pub fn list_items(owner: &str, key: &str, value: &AttrValue) -> Result<Vec<String>> {
    value.comma_items().ok_or_else(|| Error::InvalidDescriptor {
        name: owner.to_string(),
        reason: format!("{key} must be a string or a list, found a {}", value.kind()),
    })
}

/// Reads a boolean attribute; `true`, `yes` and `y` are true in any case,
/// every other text is false.
///
/// # Errors
///
/// Returns [`Error::InvalidDescriptor`] if the value is not text.
pub fn parse_bool(owner: &str, key: &str, value: &AttrValue) -> Result<bool> {
    let text = value.as_text().ok_or_else(|| Error::InvalidDescriptor {
        name: owner.to_string(),
        reason: format!("{key} must be a boolean, found a {}", value.kind()),
    })?;
    Ok(matches!(
        text.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y"
    ))
}

/// Parses the items of a `PARAMS` attribute.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] for a malformed item or a repeated
/// parameter name.
pub fn parse_params(function: &str, value: &AttrValue) -> Result<IndexMap<String, ParamSpec>> {
    let mut params = IndexMap::new();
    for item in list_items(function, "PARAMS", value)? {
        let spec = ParamSpec::parse(function, &item)?;
        if params.contains_key(&spec.name) {
            return Err(Error::InvalidParameter {
                function: function.to_string(),
                spec: item,
                reason: format!("parameter '{}' is declared twice", spec.name),
            });
        }
        params.insert(spec.name.clone(), spec);
    }
    Ok(params)
}

/// Parses a `DEPS` attribute.
///
/// # Errors
///
/// Returns [`Error::InvalidDescriptor`] for entries without `ON` or without
/// any dependency.
///
/// # Examples
///
/// ```
/// use stimulus_model::parse_dependencies;
/// use stimulus_parser::AttrValue;
///
/// let deps = parse_dependencies("f", &AttrValue::text("weights ON graph, vids ON graph mode")).unwrap();
/// assert_eq!(deps[1].parameter, "vids");
/// assert_eq!(deps[1].on, vec!["graph", "mode"]);
/// ```
pub fn parse_dependencies(function: &str, value: &AttrValue) -> Result<Vec<Dependency>> {
    list_items(function, "DEPS", value)?
        .into_iter()
        .map(|item| {
            let tokens: Vec<&str> = item.split_whitespace().collect();
            match tokens.as_slice() {
                [parameter, "ON", on @ ..] if !on.is_empty() => Ok(Dependency {
                    parameter: (*parameter).to_string(),
                    on: on.iter().map(|d| (*d).to_string()).collect(),
                }),
                _ => Err(Error::InvalidDescriptor {
                    name: function.to_string(),
                    reason: format!("malformed DEPS entry '{item}', expected '<param> ON <deps>'"),
                }),
            }
        })
        .collect()
}

/// Parses a `PARAM_NAMES` attribute into `(parameter, display name)` pairs.
///
/// # Errors
///
/// Returns [`Error::InvalidDescriptor`] for items without `=` or with an
/// empty side, and for nested mappings.
pub fn parse_param_names(function: &str, value: &AttrValue) -> Result<Vec<(String, String)>> {
    let malformed = |item: &str| Error::InvalidDescriptor {
        name: function.to_string(),
        reason: format!("malformed PARAM_NAMES entry '{item}', expected '<param> = <name>'"),
    };

    if let AttrValue::Map(map) = value {
        return map
            .iter()
            .map(|(param, display)| match display.as_text().map(str::trim) {
                Some(display) if !display.is_empty() => {
                    Ok((param.trim().to_string(), display.to_string()))
                }
                _ => Err(malformed(param.as_str())),
            })
            .collect();
    }

    list_items(function, "PARAM_NAMES", value)?
        .into_iter()
        .map(|item| match item.split_once('=') {
            Some((param, display)) if !param.trim().is_empty() && !display.trim().is_empty() => {
                Ok((param.trim().to_string(), display.trim().to_string()))
            }
            _ => Err(malformed(&item)),
        })
        .collect()
}

/// Computes the signature order of `params` from a `PARAM_ORDER` attribute.
///
/// Listed names keep their listed order. Every other parameter keeps its
/// declaration order and goes where the ellipsis is, or after the listed
/// names if there is none.
///
/// # Errors
///
/// Returns [`Error::DuplicateOrderEntry`] for a name (or ellipsis) listed
/// twice and [`Error::UnknownOrderEntry`] for a name that is not a
/// parameter.
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use stimulus_model::{ParamSpec, resolve_param_order};
/// use stimulus_parser::AttrValue;
///
/// let params: IndexMap<String, ParamSpec> = ["a", "b", "c"]
///     .into_iter()
///     .map(|n| (n.to_string(), ParamSpec::new(n, "INT")))
///     .collect();
///
/// let order = resolve_param_order("f", &AttrValue::text("b, ..., a"), &params).unwrap();
/// assert_eq!(order, vec!["b", "c", "a"]);
/// ```
pub fn resolve_param_order(
    function: &str,
    value: &AttrValue,
    params: &IndexMap<String, ParamSpec>,
) -> Result<Vec<String>> {
    let mut listed: IndexSet<String> = IndexSet::new();
    for entry in list_items(function, "PARAM_ORDER", value)? {
        if entry != ORDER_ELLIPSIS && !params.contains_key(&entry) {
            return Err(Error::UnknownOrderEntry {
                function: function.to_string(),
                entry,
            });
        }
        if listed.contains(&entry) {
            return Err(Error::DuplicateOrderEntry {
                function: function.to_string(),
                entry,
            });
        }
        listed.insert(entry);
    }

    let rest: Vec<String> = params
        .keys()
        .filter(|name| !listed.contains(*name))
        .cloned()
        .collect();
    let mut order = Vec::with_capacity(params.len());
    if listed.contains(ORDER_ELLIPSIS) {
        for entry in listed {
            if entry == ORDER_ELLIPSIS {
                order.extend(rest.iter().cloned());
            } else {
                order.push(entry);
            }
        }
    } else {
        order.extend(listed);
        order.extend(rest);
    }
    Ok(order)
}
