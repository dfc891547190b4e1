//! Structured (YAML) source format.
//!
//! A YAML document is normalized into the same attribute tree the
//! indentation format produces: scalars become text, `null` becomes an empty
//! mapping and sequences of scalars become lists.

use crate::tree::{AttrMap, AttrValue};
use serde_yaml::Value;
use stimulus_core::{Error, Result};

/// Parses a YAML document into an attribute tree; `name` labels errors.
///
/// An empty document yields an empty tree.
///
/// # Errors
///
/// Returns [`Error::Yaml`] for malformed YAML and
/// [`Error::InvalidDescriptor`] when the document is not a mapping, or
/// contains non-scalar keys or nested sequences.
///
/// # Examples
///
/// ```
/// use stimulus_parser::{AttrValue, from_yaml_str};
///
/// let tree = from_yaml_str("f:\n  IGNORE: [RR, RC]\n  RETURN: INT\n", "f.yaml").unwrap();
/// let f = tree["f"].as_map().unwrap();
/// assert_eq!(f["RETURN"], AttrValue::text("INT"));
/// assert_eq!(f["IGNORE"].as_list().unwrap().len(), 2);
/// ```
pub fn from_yaml_str(text: &str, name: &str) -> Result<AttrMap> {
    let value: Value = serde_yaml::from_str(text).map_err(|source| Error::Yaml {
        name: name.to_string(),
        source,
    })?;

    match convert(value, name)? {
        AttrValue::Map(map) => Ok(map),
        other => Err(Error::InvalidDescriptor {
            name: name.to_string(),
            reason: format!("top level must be a mapping, found {}", other.kind()),
        }),
    }
}

/// Serializes an attribute tree as YAML.
///
/// # Errors
///
/// Returns [`Error::Yaml`] if serialization fails.
pub fn to_yaml_string(tree: &AttrMap) -> Result<String> {
    serde_yaml::to_string(tree).map_err(|source| Error::Yaml {
        name: "<output>".to_string(),
        source,
    })
}

fn convert(value: Value, name: &str) -> Result<AttrValue> {
    match value {
        Value::Null => Ok(AttrValue::empty_map()),
        Value::Mapping(mapping) => {
            let mut map = AttrMap::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = scalar(key).ok_or_else(|| Error::InvalidDescriptor {
                    name: name.to_string(),
                    reason: "mapping keys must be scalars".to_string(),
                })?;
                map.insert(key, convert(value, name)?);
            }
            Ok(AttrValue::Map(map))
        }
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| {
                scalar(item).ok_or_else(|| Error::InvalidDescriptor {
                    name: name.to_string(),
                    reason: "sequence items must be scalars".to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(AttrValue::List),
        Value::Tagged(tagged) => convert(tagged.value, name),
        other => scalar(other)
            .map(AttrValue::Text)
            .ok_or_else(|| Error::InvalidDescriptor {
                name: name.to_string(),
                reason: "unsupported YAML value".to_string(),
            }),
    }
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar(tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
