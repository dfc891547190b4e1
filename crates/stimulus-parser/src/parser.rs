//! Structural parser turning scanner tokens into an attribute tree.
//!
//! The parser keeps an explicit stack of frames. Each frame holds the
//! pending keys of one line (none for an anonymous frame) and the value
//! accumulated for them so far. Every key of a key list receives its own
//! copy of the value. The bottom frame is
//! the root mapping; the stack starts with the root plus one anonymous frame,
//! so the final dedent emitted for the outermost indentation level has a
//! frame to close.

use crate::lexer::Scanner;
use crate::token::Token;
use crate::tree::{AttrMap, AttrValue};
use std::io::{BufRead, Cursor};
use stimulus_core::{Error, Result};

#[derive(Debug, Default)]
struct Frame {
    keys: Vec<String>,
    value: Option<AttrValue>,
}

impl Frame {
    fn named(keys: Vec<String>) -> Self {
        Self {
            keys,
            value: Some(AttrValue::empty_map()),
        }
    }

    const fn is_named(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// Incremental structural parser.
///
/// Feed tokens one at a time with [`Parser::feed`] and collect the tree with
/// [`Parser::finish`], or use [`parse_str`] / [`parse_reader`] for the common
/// cases.
///
/// # Examples
///
/// ```
/// use stimulus_parser::{AttrValue, Parser, tokenize};
///
/// let mut parser = Parser::new();
/// for token in tokenize("f:\n    RETURN: INT\n").unwrap() {
///     parser.feed(token).unwrap();
/// }
/// let tree = parser.finish().unwrap();
///
/// let f = tree["f"].as_map().unwrap();
/// assert_eq!(f["RETURN"], AttrValue::text("INT"));
/// ```
#[derive(Debug)]
pub struct Parser {
    stack: Vec<Frame>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Creates a parser with an empty root mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: vec![
                Frame {
                    keys: Vec::new(),
                    value: Some(AttrValue::empty_map()),
                },
                Frame::default(),
            ],
        }
    }

    /// Processes one token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] when the token cannot be placed,
    /// for instance a dedent with no open block or a key below a text value.
    pub fn feed(&mut self, token: Token) -> Result<()> {
        match token {
            Token::Indent => {
                self.stack.push(Frame::default());
            }
            Token::Key(keys) => {
                let Some(closed) = self.pop() else {
                    return Err(unexpected(&Token::Key(keys)));
                };
                if closed.is_named() {
                    self.attach(closed)?;
                }
                self.stack.push(Frame::named(keys));
            }
            Token::Text(text) => {
                let Some(top) = self.stack.last_mut() else {
                    return Err(unexpected(&Token::Text(text)));
                };
                top.value = Some(AttrValue::Text(text));
            }
            Token::Dedent => {
                let closed = self.pop().ok_or_else(|| unexpected(&Token::Dedent))?;
                if closed.is_named() {
                    self.attach(closed)?;
                } else if let Some(value) = closed.value {
                    if let Some(parent) = self.stack.last_mut() {
                        parent.value = Some(value);
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the finished tree.
    ///
    /// A stream without any entries yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedToken`] if blocks are still open or the
    /// document consists of a bare text value instead of a mapping.
    pub fn finish(mut self) -> Result<AttrMap> {
        // Closes the anonymous frame when the stream never emitted its
        // trailing dedent.
        if self.stack.len() == 2 && !self.stack[1].is_named() && self.stack[1].value.is_none() {
            self.stack.pop();
        }

        if self.stack.len() != 1 {
            return Err(Error::UnexpectedToken {
                token: format!("end of input with {} open block(s)", self.stack.len() - 1),
            });
        }

        match self.stack.pop().and_then(|root| root.value) {
            None => Ok(AttrMap::new()),
            Some(AttrValue::Map(map)) => Ok(map),
            Some(other) => Err(Error::UnexpectedToken {
                token: format!("top-level {} value", other.kind()),
            }),
        }
    }

    /// Pops the top frame, keeping the root in place.
    fn pop(&mut self) -> Option<Frame> {
        if self.stack.len() < 2 {
            return None;
        }
        self.stack.pop()
    }

    /// Stores a named frame into the mapping of the frame below it, once
    /// per key.
    fn attach(&mut self, frame: Frame) -> Result<()> {
        let Frame { mut keys, value } = frame;
        let Some(last) = keys.pop() else {
            return Ok(());
        };

        let Some(parent) = self.stack.last_mut() else {
            return Err(unexpected(&Token::key(last)));
        };

        let value = value.unwrap_or_else(AttrValue::empty_map);
        let AttrValue::Map(map) = parent.value.get_or_insert_with(AttrValue::empty_map) else {
            return Err(unexpected(&Token::key(last)));
        };
        for alias in keys {
            map.insert(alias, value.clone());
        }
        map.insert(last, value);
        Ok(())
    }
}

fn unexpected(token: &Token) -> Error {
    Error::UnexpectedToken {
        token: token.to_string(),
    }
}

/// Parses a token stream into an attribute tree.
///
/// # Errors
///
/// Propagates the first scanner error, or any structural error from
/// [`Parser::feed`] and [`Parser::finish`].
pub fn parse_tokens<I>(tokens: I) -> Result<AttrMap>
where
    I: IntoIterator<Item = Result<Token>>,
{
    let mut parser = Parser::new();
    for token in tokens {
        parser.feed(token?)?;
    }
    parser.finish()
}

/// Parses format A text into an attribute tree.
///
/// # Errors
///
/// Returns the first scanner or parser error.
///
/// # Examples
///
/// ```
/// use stimulus_parser::{AttrValue, parse_str};
///
/// let tree = parse_str("igraph_vcount:\n    PARAMS: GRAPH graph\n").unwrap();
/// assert_eq!(
///     tree["igraph_vcount"].as_map().unwrap()["PARAMS"],
///     AttrValue::text("GRAPH graph")
/// );
/// ```
pub fn parse_str(text: &str) -> Result<AttrMap> {
    parse_tokens(Scanner::new(Cursor::new(text)))
}

/// Parses format A text from a reader; `name` labels I/O errors.
///
/// # Errors
///
/// Returns the first I/O, scanner or parser error.
pub fn parse_reader<R: BufRead>(reader: R, name: &str) -> Result<AttrMap> {
    parse_tokens(Scanner::with_name(reader, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> AttrValue {
        AttrValue::text(value)
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_str("").unwrap().is_empty());
        assert!(parse_str("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_flat_entries_keep_order() {
        let tree = parse_str("b: 2\na: 1\nc: 3\n").unwrap();
        let keys: Vec<_> = tree.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(tree["a"], text("1"));
    }

    #[test]
    fn test_nested_function_block() {
        let source = "\
igraph_degree:
    PARAMS: GRAPH graph, OUT VECTOR res
    DEPS: res ON graph
    INCONV:
        IN: check %I%
        OUT: %C% <- NULL
";
        let tree = parse_str(source).unwrap();
        let f = tree["igraph_degree"].as_map().unwrap();
        assert_eq!(f["PARAMS"], text("GRAPH graph, OUT VECTOR res"));
        assert_eq!(f["DEPS"], text("res ON graph"));

        let inconv = f["INCONV"].as_map().unwrap();
        assert_eq!(inconv["IN"], text("check %I%"));
        assert_eq!(inconv["OUT"], text("%C% <- NULL"));
    }

    #[test]
    fn test_key_without_block_is_empty_map() {
        let tree = parse_str("a:\nb: x\n").unwrap();
        assert_eq!(tree["a"], AttrValue::empty_map());
        assert_eq!(tree["b"], text("x"));
    }

    #[test]
    fn test_key_list_shares_value() {
        let tree = parse_str("INT, REAL:\n    CALL: %C%\n").unwrap();
        assert_eq!(tree["INT"], tree["REAL"]);
        assert_eq!(tree["INT"].as_map().unwrap()["CALL"], text("%C%"));
    }

    #[test]
    fn test_key_list_with_nested_blocks() {
        let source = "\
INT, REAL:
    CTYPE: igraph_real_t
    INCONV:
        IN: check(%I%)
BOOL:
    CTYPE: igraph_bool_t
";
        let tree = parse_str(source).unwrap();
        let keys: Vec<_> = tree.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["INT", "REAL", "BOOL"]);
        for name in ["INT", "REAL"] {
            let ty = tree[name].as_map().unwrap();
            assert_eq!(ty["CTYPE"], text("igraph_real_t"));
            assert_eq!(ty["INCONV"].as_map().unwrap()["IN"], text("check(%I%)"));
        }
        assert_eq!(tree["BOOL"].as_map().unwrap()["CTYPE"], text("igraph_bool_t"));
    }

    #[test]
    fn test_key_list_with_inline_value() {
        let tree = parse_str("f:\n    IGNORE, FLAGS: RR\n").unwrap();
        let f = tree["f"].as_map().unwrap();
        assert_eq!(f["IGNORE"], text("RR"));
        assert_eq!(f["FLAGS"], text("RR"));
    }

    #[test]
    fn test_block_text_value() {
        let tree = parse_str("HEADER:\n    some literal text\n").unwrap();
        assert_eq!(tree["HEADER"], text("some literal text"));
    }

    #[test]
    fn test_deep_dedent() {
        let tree = parse_str("a:\n  b:\n    c: x\nd: y\n").unwrap();
        let b = tree["a"].as_map().unwrap()["b"].as_map().unwrap();
        assert_eq!(b["c"], text("x"));
        assert_eq!(tree["d"], text("y"));
    }

    #[test]
    fn test_later_key_overwrites_earlier() {
        let tree = parse_str("a: 1\nb: 2\na: 3\n").unwrap();
        assert_eq!(tree["a"], text("3"));
        assert_eq!(tree.get_index(0).unwrap().0, "a");
    }

    #[test]
    fn test_top_level_text_rejected() {
        let err = parse_str("just text\n").unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_scanner_errors_propagate() {
        let err = parse_str("a:\n    b: x\n  c: y\n").unwrap_err();
        assert!(matches!(err, Error::MalformedIndentation { line: 3 }));
    }

    #[test]
    fn test_dedent_without_block_rejected() {
        let mut parser = Parser::new();
        parser.feed(Token::Dedent).unwrap();
        let err = parser.feed(Token::Dedent).unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_unclosed_block_rejected() {
        let mut parser = Parser::new();
        parser.feed(Token::key("f")).unwrap();
        parser.feed(Token::Indent).unwrap();
        let err = parser.finish().unwrap_err();
        assert!(matches!(err, Error::UnexpectedToken { .. }));
    }

    #[test]
    fn test_continuation_value() {
        let tree = parse_str("CALL: foo(a,\\\n      b)\n").unwrap();
        assert_eq!(tree["CALL"], text("foo(a,\n  b)"));
    }
}
