//! Block markers, block handlers and the per-job block cache.
//!
//! A block-based template is copied line by line; a line that consists of a
//! marker such as `%STIMULUS%` or `%STIMULUS:extra%` is replaced by the
//! content of the named block.

use crate::session::Session;
use regex::Regex;
use std::collections::HashMap;
use stimulus_core::{BlockName, Error, Result};

/// Recognises block-marker lines for one sigil.
///
/// # Examples
///
/// ```
/// use stimulus_codegen::BlockMarker;
///
/// let marker = BlockMarker::new("STIMULUS").unwrap();
/// assert_eq!(marker.match_line("  %STIMULUS%\n").unwrap().as_str(), "functions");
/// assert_eq!(marker.match_line("%STIMULUS:extra%").unwrap().as_str(), "extra");
/// assert!(marker.match_line("x = %STIMULUS%;").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct BlockMarker {
    regex: Regex,
}

impl BlockMarker {
    /// Builds the marker pattern for `sigil`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the sigil is empty.
    pub fn new(sigil: &str) -> Result<Self> {
        if sigil.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "block sigil must not be empty".to_string(),
            });
        }
        let pattern = format!(r"^\s*%{}(?::([A-Za-z0-9_-]*))?%\s*$", regex::escape(sigil));
        let regex = Regex::new(&pattern).map_err(|e| Error::ConfigError {
            message: format!("invalid block sigil '{sigil}': {e}"),
        })?;
        Ok(Self { regex })
    }

    /// Returns the block named by `line`, or `None` if the line is not a
    /// marker. A marker without a name refers to the default block.
    #[must_use]
    pub fn match_line(&self, line: &str) -> Option<BlockName> {
        let caps = self.regex.captures(line)?;
        Some(BlockName::new(caps.get(1).map_or("", |m| m.as_str())))
    }
}

/// Renders the content of one block.
pub type BlockHandler<B> = fn(&mut B, &mut Session) -> Result<String>;

/// Explicit mapping from block names to the handlers of backend `B`.
///
/// Filled when the backend is constructed; a name without a handler is
/// [`Error::UnhandledBlock`].
#[derive(Debug)]
pub struct BlockRegistry<B> {
    handlers: HashMap<BlockName, BlockHandler<B>>,
}

impl<B> BlockRegistry<B> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `block`, replacing an earlier one.
    #[must_use]
    pub fn with(mut self, block: &str, handler: BlockHandler<B>) -> Self {
        self.handlers.insert(BlockName::new(block), handler);
        self
    }

    /// Looks up the handler of `block`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnhandledBlock`] if nothing is registered.
    pub fn get(&self, block: &BlockName) -> Result<BlockHandler<B>> {
        self.handlers
            .get(block)
            .copied()
            .ok_or_else(|| Error::UnhandledBlock {
                block: block.to_string(),
            })
    }

    /// Whether a handler is registered for `block`.
    #[must_use]
    pub fn contains(&self, block: &BlockName) -> bool {
        self.handlers.contains_key(block)
    }

    /// Renders `block` by calling its handler on `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnhandledBlock`] or the handler's error.
    pub fn render(&self, backend: &mut B, session: &mut Session, block: &BlockName) -> Result<String> {
        let handler = self.get(block)?;
        handler(backend, session)
    }
}

impl<B> Default for BlockRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Content of every block rendered so far in one job.
#[derive(Debug, Default)]
pub struct BlockCache {
    rendered: HashMap<BlockName, String>,
}

impl BlockCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the content of `block`, rendering it with `render` the first
    /// time it is asked for.
    ///
    /// # Errors
    ///
    /// Returns the error of `render`; nothing is cached in that case.
    pub fn get_or_render<F>(&mut self, block: &BlockName, render: F) -> Result<&str>
    where
        F: FnOnce(&BlockName) -> Result<String>,
    {
        if !self.rendered.contains_key(block) {
            let content = render(block)?;
            tracing::debug!("Rendered block '{block}' ({} bytes)", content.len());
            self.rendered.insert(block.clone(), content);
        }
        Ok(self.rendered.get(block).map_or("", String::as_str))
    }

    /// Number of distinct blocks rendered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    /// Whether no block has been rendered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}
