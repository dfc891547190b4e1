//! The attribute tree produced by both source formats.
//!
//! A tree is an insertion-ordered mapping from keys to values, where a value
//! is a text scalar, a nested mapping, or (only when read from the structured
//! format) a list of text scalars. Functions and types are emitted in the
//! order they appear in the tree, so order is part of the data.

use indexmap::IndexMap;
use serde::Serialize;

/// Insertion-ordered mapping of attribute names to values.
pub type AttrMap = IndexMap<String, AttrValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// A literal text scalar
    Text(String),
    /// A list of text scalars (structured sources only)
    List(Vec<String>),
    /// A nested mapping
    Map(AttrMap),
}

impl AttrValue {
    /// Creates a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates an empty mapping value.
    #[must_use]
    pub fn empty_map() -> Self {
        Self::Map(AttrMap::new())
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the mapping if this is a mapping value.
    #[must_use]
    pub const fn as_map(&self) -> Option<&AttrMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the list items if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the value's shape, for error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "mapping",
        }
    }

    /// Splits the value into trimmed items.
    ///
    /// Text is split on commas, lists are taken item by item, and empty items
    /// are dropped. An empty mapping (a bare `KEY:` line) has no items; any
    /// other mapping is not an item list and yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_parser::AttrValue;
    ///
    /// let value = AttrValue::text("RR, RC ,");
    /// assert_eq!(value.comma_items().unwrap(), vec!["RR", "RC"]);
    /// ```
    #[must_use]
    pub fn comma_items(&self) -> Option<Vec<String>> {
        let items: Vec<String> = match self {
            Self::Text(text) => text.split(',').map(|s| s.trim().to_string()).collect(),
            Self::List(items) => items.iter().map(|s| s.trim().to_string()).collect(),
            Self::Map(map) if map.is_empty() => Vec::new(),
            Self::Map(_) => return None,
        };
        Some(items.into_iter().filter(|s| !s.is_empty()).collect())
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<AttrMap> for AttrValue {
    fn from(value: AttrMap) -> Self {
        Self::Map(value)
    }
}

/// Deep-merges `source` into `target`.
///
/// Nested mappings merge key by key, lists are concatenated, and anything
/// else in `source` overwrites the value in `target`. New keys are appended
/// in `source` order.
///
/// # Examples
///
/// ```
/// use stimulus_parser::{AttrMap, AttrValue, deep_merge};
///
/// let mut target = AttrMap::new();
/// target.insert("NAME".into(), AttrValue::text("a"));
///
/// let mut source = AttrMap::new();
/// source.insert("NAME".into(), AttrValue::text("b"));
/// source.insert("CLASS".into(), AttrValue::text("c"));
///
/// deep_merge(&mut target, &source);
/// assert_eq!(target["NAME"], AttrValue::text("b"));
/// assert_eq!(target.len(), 2);
/// ```
pub fn deep_merge(target: &mut AttrMap, source: &AttrMap) {
    for (key, value) in source {
        match (target.get_mut(key), value) {
            (Some(AttrValue::Map(existing)), AttrValue::Map(incoming)) => {
                deep_merge(existing, incoming);
            }
            (Some(AttrValue::List(existing)), AttrValue::List(incoming)) => {
                existing.extend(incoming.iter().cloned());
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, AttrValue)]) -> AttrMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_accessors() {
        let text = AttrValue::text("x");
        assert_eq!(text.as_text(), Some("x"));
        assert!(text.as_map().is_none());
        assert_eq!(text.kind(), "text");

        let list = AttrValue::List(vec!["a".into()]);
        assert_eq!(list.as_list(), Some(&["a".to_string()][..]));
        assert_eq!(AttrValue::empty_map().kind(), "mapping");
    }

    #[test]
    fn test_comma_items_from_list() {
        let value = AttrValue::List(vec![" RR".into(), "".into(), "RC ".into()]);
        assert_eq!(value.comma_items().unwrap(), vec!["RR", "RC"]);
    }

    #[test]
    fn test_comma_items_from_mapping() {
        // A bare `KEY:` line parses as an empty mapping.
        assert_eq!(AttrValue::empty_map().comma_items(), Some(Vec::new()));
        let nested = AttrValue::Map(map(&[("RR", "x".into())]));
        assert!(nested.comma_items().is_none());
    }

    #[test]
    fn test_deep_merge_nested() {
        let mut target = map(&[(
            "INCONV",
            AttrValue::Map(map(&[("IN", "a".into()), ("OUT", "b".into())])),
        )]);
        let source = map(&[("INCONV", AttrValue::Map(map(&[("OUT", "c".into())])))]);

        deep_merge(&mut target, &source);

        let inconv = target["INCONV"].as_map().unwrap();
        assert_eq!(inconv["IN"], AttrValue::text("a"));
        assert_eq!(inconv["OUT"], AttrValue::text("c"));
    }

    #[test]
    fn test_deep_merge_scalar_replaces_map() {
        let mut target = map(&[("CALL", AttrValue::Map(map(&[("IN", "a".into())])))]);
        let source = map(&[("CALL", "x".into())]);
        deep_merge(&mut target, &source);
        assert_eq!(target["CALL"], AttrValue::text("x"));
    }

    #[test]
    fn test_deep_merge_preserves_order() {
        let mut target = map(&[("A", "1".into()), ("B", "2".into())]);
        let source = map(&[("C", "3".into()), ("A", "4".into())]);
        deep_merge(&mut target, &source);
        let keys: Vec<_> = target.keys().cloned().collect();
        assert_eq!(keys, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_deep_merge_lists_concatenate() {
        let mut target = map(&[("IGNORE", AttrValue::List(vec!["RR".into()]))]);
        let source = map(&[("IGNORE", AttrValue::List(vec!["RC".into()]))]);
        deep_merge(&mut target, &source);
        assert_eq!(
            target["IGNORE"],
            AttrValue::List(vec!["RR".into(), "RC".into()])
        );
    }
}
