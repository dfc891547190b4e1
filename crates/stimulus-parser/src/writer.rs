//! Writer for the indentation-sensitive format.
//!
//! Produces text that [`parse_str`](crate::parse_str) reads back into an
//! equal tree. Text values containing the continuation joiner are split over
//! several physical lines with trailing backslashes. Lists have no
//! representation of their own and are written comma-joined, so they read
//! back as text.

use crate::lexer::CONTINUATION_JOINER;
use crate::tree::{AttrMap, AttrValue};
use stimulus_core::{Error, Result};

const INDENT_UNIT: &str = "    ";

/// Serializes a tree into format A text.
///
/// Top-level entries are separated by a blank line.
///
/// # Errors
///
/// Returns [`Error::InvalidDescriptor`] for keys or values that the format
/// cannot express, such as keys containing `:` or `,`, or empty text.
///
/// # Examples
///
/// ```
/// use stimulus_parser::{AttrMap, AttrValue, parse_str, to_legacy_string};
///
/// let mut f = AttrMap::new();
/// f.insert("PARAMS".into(), AttrValue::text("INT a"));
/// let mut tree = AttrMap::new();
/// tree.insert("f".into(), AttrValue::Map(f));
///
/// let text = to_legacy_string(&tree).unwrap();
/// assert_eq!(text, "f:\n    PARAMS: INT a\n");
/// assert_eq!(parse_str(&text).unwrap(), tree);
/// ```
pub fn to_legacy_string(tree: &AttrMap) -> Result<String> {
    let mut out = String::new();
    for (i, (key, value)) in tree.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        write_entry(&mut out, key, value, 0)?;
    }
    Ok(out)
}

fn write_entry(out: &mut String, key: &str, value: &AttrValue, depth: usize) -> Result<()> {
    check_key(key)?;
    let indent = INDENT_UNIT.repeat(depth);

    match value {
        AttrValue::Text(text) => {
            out.push_str(&format!("{indent}{key}: "));
            write_text(out, key, text, &indent)?;
        }
        AttrValue::List(items) => {
            let joined = items.join(", ");
            out.push_str(&format!("{indent}{key}: "));
            write_text(out, key, &joined, &indent)?;
        }
        AttrValue::Map(map) => {
            out.push_str(&format!("{indent}{key}:\n"));
            for (child_key, child) in map {
                write_entry(out, child_key, child, depth + 1)?;
            }
        }
    }
    Ok(())
}

fn write_text(out: &mut String, key: &str, text: &str, indent: &str) -> Result<()> {
    let segments: Vec<&str> = text.split(CONTINUATION_JOINER).collect();
    let last = segments.len() - 1;

    // Leading whitespace of every physical line is lost on reading, and so
    // is trailing whitespace of the final line.
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() || segment.starts_with(char::is_whitespace) {
            return Err(invalid(key, "text segments must not be empty or start with whitespace"));
        }
        if i == last && (segment.ends_with(char::is_whitespace) || segment.ends_with('\\')) {
            return Err(invalid(key, "text must not end with whitespace or a backslash"));
        }
        if segment.contains(['\n', '\r']) {
            return Err(invalid(key, "text contains an unrepresentable line break"));
        }
    }

    for (i, segment) in segments.iter().enumerate() {
        if i == 0 {
            out.push_str(segment);
        } else {
            out.push_str(&format!("{indent}{INDENT_UNIT}{segment}"));
        }
        if i < last {
            out.push('\\');
        }
        out.push('\n');
    }
    Ok(())
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid(key, "empty key"));
    }
    if key.trim() != key || key.starts_with('#') {
        return Err(invalid(key, "key must not be padded or start with '#'"));
    }
    if key.contains([':', ',', '\n', '\r']) {
        return Err(invalid(key, "key must not contain ':', ',' or line breaks"));
    }
    Ok(())
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::InvalidDescriptor {
        name: key.to_string(),
        reason: reason.to_string(),
    }
}
