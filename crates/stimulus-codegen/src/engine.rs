//! Composition strategies and the generation job.

use crate::backend::{Backend, Composition, Inputs};
use crate::blocks::{BlockCache, BlockMarker};
use crate::report::GenerationReport;
use crate::session::Session;
use std::io::Write;
use std::path::{Path, PathBuf};
use stimulus_core::cli::OutputTarget;
use stimulus_core::{Error, GeneratorConfig, Result};
use stimulus_model::Catalog;
use tempfile::NamedTempFile;

/// Runs `backend` over `session` and returns the generated text.
///
/// # Errors
///
/// Returns the first structural error; per-function errors end up in the
/// session's diagnostics.
pub fn generate(backend: &mut dyn Backend, session: &mut Session, inputs: &Inputs) -> Result<String> {
    match backend.composition() {
        Composition::SingleBlock => generate_single_block(backend, session, inputs),
        Composition::BlockBased => generate_block_based(backend, session, inputs),
    }
}

fn generate_single_block(
    backend: &mut dyn Backend,
    session: &mut Session,
    inputs: &Inputs,
) -> Result<String> {
    let mut out = backend.preamble(session, &inputs.preamble)?;
    out.push_str(&backend.functions_block(session)?);
    out.push_str(&backend.epilogue(session, &inputs.epilogue)?);
    Ok(out)
}

fn generate_block_based(
    backend: &mut dyn Backend,
    session: &mut Session,
    inputs: &Inputs,
) -> Result<String> {
    let marker = BlockMarker::new(&session.config().block_sigil)?;
    let mut cache = BlockCache::new();
    let mut out = String::new();
    for input in inputs.all() {
        tracing::debug!("Scanning {} for block markers", input.name);
        for line in input.text.split_inclusive('\n') {
            let Some(block) = marker.match_line(line) else {
                out.push_str(line);
                continue;
            };
            out.push_str(cache.get_or_render(&block, |b| backend.render_block(session, b))?);
        }
    }
    Ok(out)
}

/// One (backend, output) pair with the files it is built from.
///
/// Every job loads its own catalog; nothing is shared between jobs.
///
/// # Examples
///
/// ```no_run
/// use stimulus_codegen::{GenerationJob, create_backend, BackendOptions};
/// use stimulus_core::GeneratorConfig;
/// use stimulus_core::cli::OutputTarget;
///
/// # fn example() -> stimulus_core::Result<()> {
/// let backend = create_backend("RR", &BackendOptions::default())?;
/// let report = GenerationJob::new(backend, GeneratorConfig::default())
///     .function_files(["functions.def"])
///     .type_files(["types-RR.def"])
///     .run(&OutputTarget::Stdout)?;
/// assert!(!report.has_diagnostics());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GenerationJob {
    backend: Box<dyn Backend>,
    config: GeneratorConfig,
    function_files: Vec<PathBuf>,
    type_files: Vec<PathBuf>,
    inputs: Vec<PathBuf>,
    epilogue_inputs: Vec<PathBuf>,
}

impl GenerationJob {
    /// Creates a job for `backend`.
    #[must_use]
    pub fn new(backend: Box<dyn Backend>, config: GeneratorConfig) -> Self {
        Self {
            backend,
            config,
            function_files: Vec::new(),
            type_files: Vec::new(),
            inputs: Vec::new(),
            epilogue_inputs: Vec::new(),
        }
    }

    /// Adds function specification files, merged in order.
    #[must_use]
    pub fn function_files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.function_files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds type specification files, merged in order.
    #[must_use]
    pub fn type_files<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.type_files.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds input files placed before the functions.
    #[must_use]
    pub fn inputs<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Adds input files placed after the functions.
    #[must_use]
    pub fn epilogue_inputs<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.epilogue_inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Loads a fresh catalog from the job's specification files and checks
    /// every function's parameter grammar.
    ///
    /// # Errors
    ///
    /// Returns I/O, parse and structural errors.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let mut catalog = Catalog::with_config(&self.config);
        for path in &self.function_files {
            catalog.load_function_file(path)?;
        }
        for path in &self.type_files {
            catalog.load_type_file(path)?;
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Generates the output in memory.
    ///
    /// # Errors
    ///
    /// Returns I/O, parse and structural errors.
    pub fn render(mut self) -> Result<GenerationReport> {
        let name = self.backend.name();
        tracing::info!("Generating {name} code");

        let catalog = self.load_catalog()?;
        let inputs = Inputs::load(self.inputs.as_slice(), self.epilogue_inputs.as_slice())?;
        let mut session = Session::new(catalog, name, self.config);
        let text = generate(self.backend.as_mut(), &mut session, &inputs)?;

        let report = GenerationReport::new(text, session.into_diagnostics());
        tracing::info!(
            "Generated {} bytes of {name} code with {} diagnostic(s)",
            report.text.len(),
            report.diagnostics.len()
        );
        Ok(report)
    }

    /// Generates the output and writes it to `target`. A destination file
    /// is only replaced once generation succeeded.
    ///
    /// # Errors
    ///
    /// Returns generation errors and I/O errors of the destination.
    pub fn run(self, target: &OutputTarget) -> Result<GenerationReport> {
        let report = self.render()?;
        write_output(target, &report.text)?;
        Ok(report)
    }
}

/// Writes generated text to `target`.
///
/// Files are written to a temporary sibling and then renamed over the
/// destination.
///
/// # Errors
///
/// Returns [`Error::Io`] if writing fails.
pub fn write_output(target: &OutputTarget, text: &str) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(text.as_bytes())
                .and_then(|()| lock.flush())
                .map_err(|e| Error::io("<stdout>", e))
        }
        OutputTarget::File(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
            file.write_all(text.as_bytes())
                .map_err(|e| Error::io(file.path(), e))?;
            file.persist(path).map_err(|e| Error::io(path, e.error))?;
            tracing::debug!("Wrote {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_output_replaces_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.R");
        std::fs::write(&path, "old").unwrap();

        write_output(&OutputTarget::File(path.clone()), "new\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
    }

    #[test]
    fn test_write_output_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.R");
        let err = write_output(&OutputTarget::File(path), "x").unwrap_err();
        assert!(err.is_io_error());
    }
}
