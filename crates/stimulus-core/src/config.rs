//! Generator configuration.
//!
//! The configuration is optional; every field has a default that matches the
//! behavior of the generator without a configuration file. It can be loaded
//! from a TOML file:
//!
//! ```toml
//! strict_dependencies = true
//! fail_on_diagnostics = false
//! block_sigil = "STIMULUS"
//! indent = "    "
//! ```
//!
//! # Examples
//!
//! ```
//! use stimulus_core::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_toml_str("fail_on_diagnostics = true").unwrap();
//! assert!(config.fail_on_diagnostics);
//! assert!(config.strict_dependencies);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default block-marker sigil.
pub const DEFAULT_BLOCK_SIGIL: &str = "STIMULUS";

/// Settings shared by every generation job of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Whether a `DEPS` entry naming an unknown parameter is an error.
    ///
    /// When `false`, the offending dependency edge is dropped with a warning
    /// and the declaring parameter is kept.
    /// Default: true
    pub strict_dependencies: bool,

    /// Whether per-function diagnostics make the process fail.
    ///
    /// Jobs always complete; this only affects the exit status.
    /// Default: false
    pub fail_on_diagnostics: bool,

    /// Sigil of the block markers in block-based template files.
    /// Default: `STIMULUS`
    pub block_sigil: String,

    /// Indentation unit used by backends for nested generated lines.
    /// Default: four spaces
    pub indent: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            strict_dependencies: true,
            fail_on_diagnostics: false,
            block_sigil: DEFAULT_BLOCK_SIGIL.to_string(),
            indent: "    ".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use stimulus_core::GeneratorConfig;
    ///
    /// let config = GeneratorConfig::builder()
    ///     .strict_dependencies(false)
    ///     .indent("  ")
    ///     .build();
    ///
    /// assert!(!config.strict_dependencies);
    /// assert_eq!(config.indent, "  ");
    /// ```
    #[must_use]
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }

    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the text is not valid TOML, contains
    /// unknown keys, or fails validation.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::ConfigError {
            message: format!("failed to parse configuration: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::ConfigError`] if its contents are invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the block sigil is empty or contains characters
    /// that would make block markers ambiguous, or if the indentation unit
    /// contains anything but spaces and tabs.
    pub fn validate(&self) -> Result<()> {
        if self.block_sigil.is_empty() {
            return Err(Error::ConfigError {
                message: "block_sigil cannot be empty".to_string(),
            });
        }

        if !self
            .block_sigil
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::ConfigError {
                message: format!(
                    "block_sigil '{}' may only contain ASCII letters, digits and '_'",
                    self.block_sigil
                ),
            });
        }

        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(Error::ConfigError {
                message: "indent may only contain spaces and tabs".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for [`GeneratorConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Creates a builder initialised with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether unresolved dependencies are errors.
    #[must_use]
    pub const fn strict_dependencies(mut self, strict: bool) -> Self {
        self.config.strict_dependencies = strict;
        self
    }

    /// Sets whether diagnostics fail the run.
    #[must_use]
    pub const fn fail_on_diagnostics(mut self, fail: bool) -> Self {
        self.config.fail_on_diagnostics = fail;
        self
    }

    /// Sets the block-marker sigil.
    #[must_use]
    pub fn block_sigil(mut self, sigil: impl Into<String>) -> Self {
        self.config.block_sigil = sigil.into();
        self
    }

    /// Sets the indentation unit.
    #[must_use]
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.config.indent = indent.into();
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}
