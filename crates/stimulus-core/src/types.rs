//! Strong domain types for the generator.
//!
//! Backend names and block names travel through the whole pipeline as plain
//! strings in the specification files (`IGNORE: RR, RC`) and in template
//! files (`%STIMULUS:extra%`). Wrapping them keeps them from being mixed up
//! with function or type names.
//!
//! # Examples
//!
//! ```
//! use stimulus_core::{BackendName, BlockName};
//!
//! let backend = BackendName::new("RC");
//! let block = BlockName::default();
//! assert_eq!(backend.as_str(), "RC");
//! assert_eq!(block.as_str(), "functions");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable name of a code generation backend.
///
/// This is the name matched against the `IGNORE` attribute of function
/// descriptors and the name accepted by the `-l` command-line flag.
///
/// # Examples
///
/// ```
/// use stimulus_core::BackendName;
///
/// let name = BackendName::new("JavaJava");
/// assert_eq!(name.to_string(), "JavaJava");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BackendName(String);

impl BackendName {
    /// Creates a new backend name.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the backend name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BackendName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BackendName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Name of a block in a block-based template file.
///
/// A marker without an explicit name refers to [`BlockName::FUNCTIONS`].
///
/// # Examples
///
/// ```
/// use stimulus_core::BlockName;
///
/// assert_eq!(BlockName::new("").as_str(), "functions");
/// assert_eq!(BlockName::new("extra").as_str(), "extra");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockName(String);

impl BlockName {
    /// Name of the default block.
    pub const FUNCTIONS: &'static str = "functions";

    /// Creates a block name; an empty name means the default block.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self::default()
        } else {
            Self(name)
        }
    }

    /// Returns the block name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BlockName {
    fn default() -> Self {
        Self(Self::FUNCTIONS.to_string())
    }
}

impl fmt::Display for BlockName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_equality() {
        assert_eq!(BackendName::new("RR"), BackendName::from("RR"));
        assert_ne!(BackendName::new("RR"), BackendName::new("RC"));
    }

    #[test]
    fn test_block_name_default() {
        assert_eq!(BlockName::default().as_str(), BlockName::FUNCTIONS);
        assert_eq!(BlockName::new(""), BlockName::default());
    }

    #[test]
    fn test_block_name_custom() {
        let block = BlockName::new("extra");
        assert_eq!(block.to_string(), "extra");
    }
}
