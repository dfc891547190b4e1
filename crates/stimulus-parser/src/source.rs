//! Source-format selection and file loading.

use crate::parser::parse_reader;
use crate::tree::AttrMap;
use crate::writer::to_legacy_string;
use crate::yaml::{from_yaml_str, to_yaml_string};
use std::fmt;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use stimulus_core::{Error, Result};

/// The two accepted specification formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Indentation-sensitive format (format A).
    Legacy,
    /// YAML (format B).
    Yaml,
}

impl SourceFormat {
    /// Picks the format from a file extension: `.yaml` and `.yml` select
    /// YAML, anything else the indentation format.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use stimulus_parser::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::from_path(Path::new("types-RR.yaml")), SourceFormat::Yaml);
    /// assert_eq!(SourceFormat::from_path(Path::new("functions.def")), SourceFormat::Legacy);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Legacy,
        }
    }

    /// Parses text in this format; `name` labels errors.
    ///
    /// # Errors
    ///
    /// Returns the scanner, parser or YAML error for malformed input.
    pub fn parse(self, text: &str, name: &str) -> Result<AttrMap> {
        match self {
            Self::Legacy => parse_reader(text.as_bytes(), name),
            Self::Yaml => from_yaml_str(text, name),
        }
    }

    /// Serializes a tree in this format.
    ///
    /// # Errors
    ///
    /// Returns an error for trees the format cannot express.
    pub fn write(self, tree: &AttrMap) -> Result<String> {
        match self {
            Self::Legacy => to_legacy_string(tree),
            Self::Yaml => to_yaml_string(tree),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Yaml => f.write_str("yaml"),
        }
    }
}

/// Loads a specification file, choosing the format by extension.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, or the parse error of
/// the selected format.
pub fn load_file(path: &Path) -> Result<AttrMap> {
    let format = SourceFormat::from_path(path);
    let name = path.display().to_string();
    tracing::debug!("Loading {} as {} source", name, format);

    let tree = match format {
        SourceFormat::Legacy => {
            let file = File::open(path).map_err(|e| Error::io(path, e))?;
            parse_reader(BufReader::new(file), &name)?
        }
        SourceFormat::Yaml => {
            let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
            from_yaml_str(&text, &name)?
        }
    };

    tracing::debug!("Loaded {} top-level entries from {}", tree.len(), name);
    Ok(tree)
}
