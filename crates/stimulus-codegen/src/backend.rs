//! The contract between the generation engine and a target backend.

use crate::session::Session;
use std::fmt;
use std::fs;
use std::path::Path;
use stimulus_core::{BlockName, Error, Result};

/// How a backend assembles its output from the input files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// Preamble inputs verbatim, then every function, then epilogue inputs
    /// verbatim.
    SingleBlock,
    /// Input files are templates; marker lines are replaced by blocks.
    BlockBased,
}

/// A plain input file handed to a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Name used in messages (usually the path).
    pub name: String,
    /// Full contents.
    pub text: String,
}

impl InputFile {
    /// Creates an input from in-memory text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Reads an input file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::new(path.display().to_string(), text))
    }
}

/// Input files of one job, split by placement.
///
/// Block-based backends scan preamble and epilogue inputs alike, in that
/// order.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    /// Emitted before the functions.
    pub preamble: Vec<InputFile>,
    /// Emitted after the functions.
    pub epilogue: Vec<InputFile>,
}

impl Inputs {
    /// Creates an input set.
    #[must_use]
    pub const fn new(preamble: Vec<InputFile>, epilogue: Vec<InputFile>) -> Self {
        Self { preamble, epilogue }
    }

    /// Reads every input file.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    pub fn load(preamble: &[impl AsRef<Path>], epilogue: &[impl AsRef<Path>]) -> Result<Self> {
        Ok(Self {
            preamble: preamble
                .iter()
                .map(|p| InputFile::load(p.as_ref()))
                .collect::<Result<_>>()?,
            epilogue: epilogue
                .iter()
                .map(|p| InputFile::load(p.as_ref()))
                .collect::<Result<_>>()?,
        })
    }

    /// All inputs, preamble first.
    pub fn all(&self) -> impl Iterator<Item = &InputFile> {
        self.preamble.iter().chain(&self.epilogue)
    }
}

/// Concatenates input files verbatim.
#[must_use]
pub fn verbatim(inputs: &[InputFile]) -> String {
    inputs.iter().map(|input| input.text.as_str()).collect()
}

/// A target language.
///
/// A backend renders single functions; the engine decides which functions
/// to render, in which order, and what happens to per-function failures.
pub trait Backend: fmt::Debug {
    /// Stable name, matched against `IGNORE` lists.
    fn name(&self) -> &'static str;

    /// Composition strategy of the backend.
    fn composition(&self) -> Composition {
        Composition::SingleBlock
    }

    /// One-line comment in the target language that replaces the output of
    /// a failed function.
    fn comment(&self, text: &str) -> String;

    /// Renders one function.
    ///
    /// # Errors
    ///
    /// Per-function errors are turned into comments by the engine; any other
    /// error aborts the job.
    fn render_function(&mut self, session: &mut Session, function: &str) -> Result<String>;

    /// Text emitted before the functions block.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn preamble(&mut self, _session: &mut Session, inputs: &[InputFile]) -> Result<String> {
        Ok(verbatim(inputs))
    }

    /// The functions block: every generatable function in catalog order.
    ///
    /// # Errors
    ///
    /// Returns the first error that is not per-function.
    fn functions_block(&mut self, session: &mut Session) -> Result<String> {
        render_functions(self, session)
    }

    /// Text emitted after the functions block.
    ///
    /// # Errors
    ///
    /// Backend-specific.
    fn epilogue(&mut self, _session: &mut Session, inputs: &[InputFile]) -> Result<String> {
        Ok(verbatim(inputs))
    }

    /// Renders a named block of a block-based template.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnhandledBlock`] for every block but the functions
    /// block unless the backend registers more.
    fn render_block(&mut self, session: &mut Session, block: &BlockName) -> Result<String> {
        if block.as_str() == BlockName::FUNCTIONS {
            self.functions_block(session)
        } else {
            Err(Error::UnhandledBlock {
                block: block.to_string(),
            })
        }
    }
}

/// Renders one function, turning a per-function error into a diagnostic and
/// the backend's comment.
///
/// # Errors
///
/// Returns errors that are not per-function unchanged.
pub fn render_guarded<B: Backend + ?Sized>(
    backend: &mut B,
    session: &mut Session,
    function: &str,
) -> Result<String> {
    match backend.render_function(session, function) {
        Ok(text) => Ok(text),
        Err(err) if err.is_per_function() => {
            session.record(function, &err);
            Ok(backend.comment(&err.to_string()))
        }
        Err(err) => Err(err),
    }
}

/// Renders every generatable function of the session in catalog order.
///
/// # Errors
///
/// Returns the first error that is not per-function.
pub fn render_functions<B: Backend + ?Sized>(backend: &mut B, session: &mut Session) -> Result<String> {
    let mut out = String::new();
    for name in session.generatable_functions() {
        out.push_str(&render_guarded(backend, session, &name)?);
    }
    Ok(out)
}
