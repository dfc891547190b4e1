//! Indentation of generated text.

/// Prefixes every non-blank line of a text with a fixed indentation.
///
/// Empty text stays empty, so an omitted chunk does not turn into a line of
/// whitespace.
///
/// # Examples
///
/// ```
/// use stimulus_codegen::Indent;
///
/// let indent = Indent::new("    ");
/// assert_eq!(indent.apply("a;\n\nb;"), "    a;\n\n    b;");
/// assert_eq!(indent.apply(""), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indent {
    prefix: String,
}

impl Indent {
    /// Creates an indenter with the given prefix.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The indentation prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Indents `text`. Lines consisting only of whitespace are left alone.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.prefix.len());
        for line in text.split_inclusive('\n') {
            if !line.trim().is_empty() {
                out.push_str(&self.prefix);
            }
            out.push_str(line);
        }
        out
    }
}
