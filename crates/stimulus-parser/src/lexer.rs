//! Scanner for the indentation-sensitive specification format.
//!
//! The scanner turns a text stream into a flat sequence of [`Token`]s, one
//! physical line at a time:
//!
//! - blank lines and lines starting with `#` produce nothing;
//! - a trailing backslash joins the next physical line using a two-space
//!   soft indent (`"\n  "`);
//! - `key: value` produces `KEY`, `INDENT`, `TEXT`, `DEDENT`, `key:` alone
//!   produces only `KEY`; a comma-separated key list is one `KEY` token
//!   whose keys share the value or the nested block;
//! - any other line produces `TEXT`;
//! - indentation changes produce `INDENT` / `DEDENT`, and the end of the
//!   stream closes every open level, including the outermost one.
//!
//! Tokens are produced lazily; nothing is read from the stream until the
//! caller asks for the next token.
//!
//! # Examples
//!
//! ```
//! use stimulus_parser::{Token, tokenize};
//!
//! let tokens = tokenize("f:\n    RETURN: INT\n").unwrap();
//! assert_eq!(
//!     tokens,
//!     vec![
//!         Token::key("f"),
//!         Token::Indent,
//!         Token::key("RETURN"),
//!         Token::Indent,
//!         Token::text("INT"),
//!         Token::Dedent,
//!         Token::Dedent,
//!         Token::Dedent,
//!     ]
//! );
//! ```

use crate::token::Token;
use std::collections::VecDeque;
use std::io::{BufRead, Cursor};
use stimulus_core::{Error, Result};

/// Soft indent inserted where a continued line is joined with the next one.
pub const CONTINUATION_JOINER: &str = "\n  ";

/// Lazy token stream over a buffered reader.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: R,
    name: String,
    indent_stack: Vec<usize>,
    line: usize,
    pending: VecDeque<Token>,
    finished: bool,
}

impl<R: BufRead> Scanner<R> {
    /// Creates a scanner over the given reader.
    pub fn new(reader: R) -> Self {
        Self::with_name(reader, "<input>")
    }

    /// Creates a scanner whose I/O errors are reported against `name`.
    pub fn with_name(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            indent_stack: vec![0],
            line: 0,
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Reads one physical line without its line terminator.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|e| Error::io(self.name.as_str(), e))?;
        if read == 0 {
            return Ok(None);
        }

        self.line += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    /// Scans lines until at least one token is queued or the stream ends.
    fn advance(&mut self) -> Result<()> {
        let raw = loop {
            let Some(raw) = self.read_line()? else {
                for _ in self.indent_stack.drain(..) {
                    self.pending.push_back(Token::Dedent);
                }
                self.finished = true;
                return Ok(());
            };

            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            break raw;
        };

        let lineno = self.line;
        let indent = raw.chars().take_while(|c| *c == ' ' || *c == '\t').count();
        self.update_indentation(indent, lineno)?;

        let mut line = raw.trim().to_string();
        while line.ends_with('\\') {
            line.pop();
            let next = self.read_line()?.unwrap_or_default();
            line.push_str(CONTINUATION_JOINER);
            line.push_str(next.trim());
        }

        self.split_line(&line, lineno)
    }

    fn update_indentation(&mut self, indent: usize, lineno: usize) -> Result<()> {
        let top = self.indent_stack.last().copied().unwrap_or(0);
        if indent > top {
            self.indent_stack.push(indent);
            self.pending.push_back(Token::Indent);
            return Ok(());
        }

        while self.indent_stack.last().is_some_and(|level| indent < *level) {
            self.indent_stack.pop();
            self.pending.push_back(Token::Dedent);
        }

        if self.indent_stack.last() != Some(&indent) {
            return Err(Error::MalformedIndentation { line: lineno });
        }
        Ok(())
    }

    fn split_line(&mut self, line: &str, lineno: usize) -> Result<()> {
        let Some((keys, value)) = line.split_once(':') else {
            self.pending.push_back(Token::text(line));
            return Ok(());
        };

        let (keys, value) = (keys.trim(), value.trim());
        if keys.is_empty() {
            return Err(Error::MissingKeyword { line: lineno });
        }

        let keys: Vec<&str> = keys.split(',').map(str::trim).collect();
        if keys.iter().any(|key| key.is_empty()) {
            return Err(Error::MissingKeyword { line: lineno });
        }
        self.pending.push_back(Token::keys(keys));
        if !value.is_empty() {
            self.pending.push_back(Token::Indent);
            self.pending.push_back(Token::text(value));
            self.pending.push_back(Token::Dedent);
        }
        Ok(())
    }
}

impl<R: BufRead> Iterator for Scanner<R> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            if let Err(err) = self.advance() {
                self.finished = true;
                self.pending.clear();
                return Some(Err(err));
            }
        }
    }
}

/// Scans a complete string into a token vector.
///
/// # Errors
///
/// Returns [`Error::MalformedIndentation`] or [`Error::MissingKeyword`] for
/// the first offending line.
pub fn tokenize(text: &str) -> Result<Vec<Token>> {
    Scanner::new(Cursor::new(text)).collect()
}
