//! Generation engine and target backends for the Stimulus binding generator.
//!
//! A [`GenerationJob`] loads a [`stimulus_model::Catalog`] from function and
//! type specification files and drives one [`Backend`] over it:
//!
//! - single-block backends emit the preamble inputs, every generatable
//!   function and the epilogue inputs;
//! - block-based backends copy their input files and replace marker lines
//!   such as `%STIMULUS%` with the content of the named block.
//!
//! Per-function problems (unknown types, unresolved placeholders,
//! unsupported conventions) replace the function's output with a comment
//! and are returned as [`Diagnostic`]s; structural problems abort the job.
//!
//! # Examples
//!
//! ```
//! use stimulus_codegen::{Inputs, Session, create_backend, generate, BackendOptions};
//! use stimulus_core::GeneratorConfig;
//! use stimulus_model::Catalog;
//! use stimulus_parser::parse_str;
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .load_functions(&parse_str("igraph_vcount:\n    PARAMS: GRAPH graph\n").unwrap())
//!     .unwrap();
//!
//! let mut backend = create_backend("RNamespace", &BackendOptions::default()).unwrap();
//! let mut session = Session::new(catalog, backend.name(), GeneratorConfig::default());
//! let text = generate(backend.as_mut(), &mut session, &Inputs::default()).unwrap();
//! assert_eq!(text, "export(graph.vcount)\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod backend;
pub mod backends;
mod blocks;
mod context;
mod docstrings;
mod engine;
mod indent;
mod registry;
mod report;
mod session;
mod substitute;
pub mod template_engine;

pub use backend::{Backend, Composition, InputFile, Inputs, render_functions, render_guarded, verbatim};
pub use blocks::{BlockCache, BlockHandler, BlockMarker, BlockRegistry};
pub use context::{FunctionContext, Param, ResultShape};
pub use docstrings::FolderDocstringProvider;
pub use engine::{GenerationJob, generate, write_output};
pub use indent::Indent;
pub use registry::{BACKEND_NAMES, BackendOptions, create_backend, is_known_backend};
pub use report::{Diagnostic, GenerationReport};
pub use session::Session;
pub use substitute::{Naming, Placeholder, Substitution, placeholders};
