//! Documentation text for generated functions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use stimulus_core::{Error, Result};

/// Reads function documentation from a folder of `<function>.txt` files.
///
/// The folder is read on first use; every `.txt` file contributes its
/// trimmed contents under its file stem.
///
/// # Examples
///
/// ```
/// use stimulus_codegen::FolderDocstringProvider;
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("igraph_vcount.txt"), "Number of vertices.\n").unwrap();
///
/// let docs = FolderDocstringProvider::new(dir.path());
/// assert_eq!(docs.get("igraph_vcount").unwrap(), Some("Number of vertices."));
/// assert_eq!(docs.get("igraph_ecount").unwrap(), None);
/// ```
#[derive(Debug)]
pub struct FolderDocstringProvider {
    dir: PathBuf,
    docs: OnceLock<HashMap<String, String>>,
}

impl FolderDocstringProvider {
    /// Creates a provider for `dir`. Nothing is read yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            docs: OnceLock::new(),
        }
    }

    /// The folder the documentation is read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Documentation of `function`, if the folder has any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the folder or one of its `.txt` files cannot
    /// be read.
    pub fn get(&self, function: &str) -> Result<Option<&str>> {
        if let Some(docs) = self.docs.get() {
            return Ok(docs.get(function).map(String::as_str));
        }
        let loaded = load_folder(&self.dir)?;
        let docs = self.docs.get_or_init(|| loaded);
        Ok(docs.get(function).map(String::as_str))
    }
}

fn load_folder(dir: &Path) -> Result<HashMap<String, String>> {
    let mut docs = HashMap::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") || !path.is_file() {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let text = fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        docs.insert(stem.to_string(), text.trim().to_string());
    }
    tracing::debug!("Loaded {} docstring(s) from {}", docs.len(), dir.display());
    Ok(docs)
}
