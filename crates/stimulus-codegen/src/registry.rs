//! Lookup of backends by their stable name.

use crate::backend::Backend;
use crate::backends::{
    JavaBackend, JavaGlueBackend, ListTypesBackend, PythonCTypesBackend, PythonTypedWrapperBackend,
    RGlueBackend, RNamespaceBackend, RWrapperBackend, ShellBackend, ShellLinksBackend,
    ValidatorBackend,
};
use crate::docstrings::FolderDocstringProvider;
use std::path::PathBuf;
use stimulus_core::{Error, Result};

/// Names of every known backend, as used by `-l` and `IGNORE`.
pub const BACKEND_NAMES: &[&str] = &[
    "RR",
    "RC",
    "RNamespace",
    "JavaJava",
    "JavaC",
    "PythonCTypes",
    "PythonCTypesTypedWrapper",
    "Shell",
    "ShellLn",
    "DebugListTypes",
    "DebugValidateFunctions",
];

/// Options that only some backends use.
#[derive(Debug, Clone, Default)]
pub struct BackendOptions {
    /// Folder of `<function>.txt` documentation files for `RR`.
    pub docstrings: Option<PathBuf>,
}

/// Returns `true` if `name` is a known backend.
#[must_use]
pub fn is_known_backend(name: &str) -> bool {
    BACKEND_NAMES.contains(&name)
}

/// Creates the backend registered under `name`.
///
/// # Errors
///
/// Returns [`Error::UnknownBackend`] for an unregistered name and
/// [`Error::TemplateError`] if a backend skeleton does not compile.
///
/// # Examples
///
/// ```
/// use stimulus_codegen::{BackendOptions, create_backend};
///
/// let backend = create_backend("RNamespace", &BackendOptions::default()).unwrap();
/// assert_eq!(backend.name(), "RNamespace");
/// assert!(create_backend("Cobol", &BackendOptions::default()).is_err());
/// ```
pub fn create_backend(name: &str, options: &BackendOptions) -> Result<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match name {
        "RR" => {
            let backend = RWrapperBackend::new();
            match &options.docstrings {
                Some(dir) => Box::new(backend.with_docstrings(FolderDocstringProvider::new(dir))),
                None => Box::new(backend),
            }
        }
        "RC" => Box::new(RGlueBackend::new()?),
        "RNamespace" => Box::new(RNamespaceBackend),
        "JavaJava" => Box::new(JavaBackend::new()),
        "JavaC" => Box::new(JavaGlueBackend::new()?),
        "PythonCTypes" => Box::new(PythonCTypesBackend::new()),
        "PythonCTypesTypedWrapper" => Box::new(PythonTypedWrapperBackend::new()),
        "Shell" => Box::new(ShellBackend::new()?),
        "ShellLn" => Box::new(ShellLinksBackend),
        "DebugListTypes" => Box::new(ListTypesBackend::new()),
        "DebugValidateFunctions" => Box::new(ValidatorBackend::new()?),
        other => {
            return Err(Error::UnknownBackend {
                name: other.to_string(),
            });
        }
    };
    tracing::debug!("Created {name} backend");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_backend_is_created() {
        for name in BACKEND_NAMES {
            let backend = create_backend(name, &BackendOptions::default()).unwrap();
            assert_eq!(backend.name(), *name);
        }
    }

    #[test]
    fn test_unknown_backend() {
        let err = create_backend("Fortran", &BackendOptions::default()).unwrap_err();
        assert!(err.is_unknown_backend());
        assert!(!is_known_backend("Fortran"));
        assert!(!is_known_backend("pythonctypes"));
        assert!(is_known_backend("PythonCTypes"));
        assert!(is_known_backend("ShellLn"));
    }
}
