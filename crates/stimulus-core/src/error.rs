//! Error types for the Stimulus binding generator.
//!
//! Errors fall into three families, and the family decides how far an error
//! propagates:
//!
//! - **Structural** errors (scanner, parser, parameter and dependency
//!   grammar) mean the specification itself is corrupt. They abort the whole
//!   generation job.
//! - **Per-function** errors (unknown types, unresolved placeholders,
//!   unsupported result shapes) only invalidate the output of a single
//!   function. The engine replaces that function's output with a diagnostic
//!   comment and continues.
//! - **Boundary** errors (unreadable files, unknown backends, bad arguments)
//!   are raised before any job starts.
//!
//! # Examples
//!
//! ```
//! use stimulus_core::{Error, Result};
//!
//! fn check_line(indent: usize, known: &[usize], line: usize) -> Result<()> {
//!     if !known.contains(&indent) {
//!         return Err(Error::MalformedIndentation { line });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_line(3, &[0, 4], 12).unwrap_err();
//! assert!(err.is_structural());
//! assert_eq!(err.to_string(), "Bad indentation in line 12");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the Stimulus workspace.
///
/// All crates in the workspace report failures through this type so that the
/// engine can apply one propagation policy everywhere.
#[derive(Error, Debug)]
pub enum Error {
    /// A dedent landed on an indentation level that was never pushed.
    #[error("Bad indentation in line {line}")]
    MalformedIndentation {
        /// 1-based line number of the offending line
        line: usize,
    },

    /// A line contains a colon but nothing before it.
    #[error("Missing keyword in line {line}")]
    MissingKeyword {
        /// 1-based line number of the offending line
        line: usize,
    },

    /// The structural parser received a token it cannot place.
    ///
    /// This indicates a broken contract between scanner and parser rather
    /// than a problem with the input file.
    #[error("Unexpected token: {token}")]
    UnexpectedToken {
        /// Debug rendering of the token
        token: String,
    },

    /// A single item of a `PARAMS` attribute does not follow the grammar.
    #[error("Invalid parameter specification '{spec}' in function '{function}': {reason}")]
    InvalidParameter {
        /// Function that declares the parameter
        function: String,
        /// The raw, trimmed item text
        spec: String,
        /// What is wrong with it
        reason: String,
    },

    /// An attribute has a shape the model cannot interpret (for instance a
    /// mapping where a comma-separated string is required).
    #[error("Invalid descriptor '{name}': {reason}")]
    InvalidDescriptor {
        /// Function or type name
        name: String,
        /// Description of the problem
        reason: String,
    },

    /// A `DEPS` entry references a parameter that does not exist.
    #[error(
        "Dependency '{dependency}' declared by parameter '{parameter}' of function '{function}' does not name a parameter of that function"
    )]
    UnresolvedDependency {
        /// Function whose `DEPS` attribute is broken
        function: String,
        /// Parameter that declared the dependency
        parameter: String,
        /// The missing dependency name
        dependency: String,
    },

    /// A `PARAM_ORDER` entry appears more than once.
    #[error("Parameter '{entry}' is listed more than once in PARAM_ORDER of function '{function}'")]
    DuplicateOrderEntry {
        /// Function whose order is broken
        function: String,
        /// Repeated entry
        entry: String,
    },

    /// A `PARAM_ORDER` entry does not name a parameter.
    #[error("PARAM_ORDER of function '{function}' refers to unknown parameter '{entry}'")]
    UnknownOrderEntry {
        /// Function whose order is broken
        function: String,
        /// Unknown entry
        entry: String,
    },

    /// An attribute (other than `DEPS` and `PARAM_ORDER`) refers to a
    /// parameter that does not exist, e.g. a `PARAM_NAMES` override.
    #[error("{attribute} of function '{function}' refers to unknown parameter '{parameter}'")]
    UnknownParameter {
        /// Function that owns the attribute
        function: String,
        /// Attribute key
        attribute: String,
        /// Unknown parameter name
        parameter: String,
    },

    /// A parameter or return type is missing from the type catalog.
    #[error("Unknown type '{type_name}' in function '{function}'")]
    UnknownType {
        /// Function being generated
        function: String,
        /// Unresolved abstract type name
        type_name: String,
    },

    /// A template still contains a dependency placeholder after
    /// substitution.
    #[error(
        "Missing dependency declaration for {type_name} {parameter} in function {function} (unresolved {placeholder})"
    )]
    UnresolvedPlaceholder {
        /// Function being generated
        function: String,
        /// Parameter whose template was rendered
        parameter: String,
        /// Abstract type of that parameter
        type_name: String,
        /// The placeholder left in the text, e.g. `%I2%`
        placeholder: String,
    },

    /// The backend cannot represent more than one output value.
    #[error("{function}: {count} output parameters cannot be returned by this backend")]
    UnsupportedMultiOutput {
        /// Function being generated
        function: String,
        /// Number of output parameters found
        count: usize,
    },

    /// A backend-specific calling-convention check failed.
    #[error("{function}: calling convention unsupported: {reason}")]
    CalleeConventionUnsupported {
        /// Function being generated
        function: String,
        /// Why the function does not fit
        reason: String,
    },

    /// A block marker names a block that the backend has no handler for.
    #[error("No handler registered for block '{block}'")]
    UnhandledBlock {
        /// Name of the block
        block: String,
    },

    /// The requested target backend does not exist.
    #[error("Unknown language: {name}")]
    UnknownBackend {
        /// Requested backend name
        name: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A structured (YAML) specification could not be read or written.
    #[error("YAML error in {name}: {source}")]
    Yaml {
        /// Source name (usually a file path)
        name: String,
        /// Underlying serde error
        #[source]
        source: serde_yaml::Error,
    },

    /// A backend skeleton template failed to register or render.
    #[error("Template error: {message}")]
    TemplateError {
        /// Description of the failure
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if the error means the specification itself is
    /// corrupt and the whole job must abort.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_core::Error;
    ///
    /// let err = Error::MissingKeyword { line: 3 };
    /// assert!(err.is_structural());
    /// assert!(!err.is_per_function());
    /// ```
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::MalformedIndentation { .. }
                | Self::MissingKeyword { .. }
                | Self::UnexpectedToken { .. }
                | Self::InvalidParameter { .. }
                | Self::InvalidDescriptor { .. }
                | Self::UnresolvedDependency { .. }
                | Self::DuplicateOrderEntry { .. }
                | Self::UnknownOrderEntry { .. }
                | Self::UnknownParameter { .. }
        )
    }

    /// Returns `true` if the error only invalidates the function being
    /// generated.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_core::Error;
    ///
    /// let err = Error::UnknownType {
    ///     function: "igraph_vcount".to_string(),
    ///     type_name: "GRAPH".to_string(),
    /// };
    /// assert!(err.is_per_function());
    /// ```
    #[must_use]
    pub const fn is_per_function(&self) -> bool {
        matches!(
            self,
            Self::UnknownType { .. }
                | Self::UnresolvedPlaceholder { .. }
                | Self::UnsupportedMultiOutput { .. }
                | Self::CalleeConventionUnsupported { .. }
        )
    }

    /// Returns `true` if this is an I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns `true` if this is an unknown backend error.
    #[must_use]
    pub const fn is_unknown_backend(&self) -> bool {
        matches!(self, Self::UnknownBackend { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Wraps an I/O error together with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias used throughout the workspace.
///
/// # Examples
///
/// ```
/// use stimulus_core::{Error, Result};
///
/// fn backend(name: &str) -> Result<&str> {
///     if name.is_empty() {
///         return Err(Error::UnknownBackend { name: name.to_string() });
///     }
///     Ok(name)
/// }
///
/// assert!(backend("RR").is_ok());
/// assert!(backend("").is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;
