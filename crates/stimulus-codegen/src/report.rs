//! Results of a generation job.

use serde::Serialize;
use std::fmt;

/// A per-function problem that replaced the function's output with a
/// comment but did not stop the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Function whose output was replaced.
    pub function: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic.
    pub fn new(function: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.function, self.message)
    }
}

/// Output of a completed generation job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    /// The generated text.
    pub text: String,
    /// Problems found while generating it.
    pub diagnostics: Vec<Diagnostic>,
}

impl GenerationReport {
    /// Creates a report.
    #[must_use]
    pub const fn new(text: String, diagnostics: Vec<Diagnostic>) -> Self {
        Self { text, diagnostics }
    }

    /// Returns `true` if any function was replaced by a diagnostic.
    #[must_use]
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
