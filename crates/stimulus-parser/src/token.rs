//! Structural tokens produced by the scanner.

use std::fmt;

/// A single structural token.
///
/// Tokens carry no position information; the scanner reports line numbers
/// through its errors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Indentation increased; a nested block starts.
    Indent,
    /// Indentation decreased by one level; the innermost block ends.
    Dedent,
    /// The keys of one line, sharing the value or nested block that
    /// follows. Usually a single key.
    Key(Vec<String>),
    /// A literal text value.
    Text(String),
}

impl Token {
    /// Creates a [`Token::Key`] with a single key.
    #[must_use]
    pub fn key(value: impl Into<String>) -> Self {
        Self::Key(vec![value.into()])
    }

    /// Creates a [`Token::Key`] for a key list such as `INT, REAL:`.
    #[must_use]
    pub fn keys<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Key(values.into_iter().map(Into::into).collect())
    }

    /// Creates a [`Token::Text`].
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indent => f.write_str("INDENT"),
            Self::Dedent => f.write_str("DEDENT"),
            Self::Key(keys) => write!(f, "KEY({})", keys.join(", ")),
            Self::Text(text) => write!(f, "TEXT({text:?})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Token::Indent.to_string(), "INDENT");
        assert_eq!(Token::key("PARAMS").to_string(), "KEY(PARAMS)");
        assert_eq!(Token::keys(["INT", "REAL"]).to_string(), "KEY(INT, REAL)");
        assert_eq!(Token::text("a b").to_string(), "TEXT(\"a b\")");
    }
}
