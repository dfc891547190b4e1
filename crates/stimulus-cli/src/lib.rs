//! Stimulus CLI library.
//!
//! Argument definitions and the job runner behind the `stimulus` binary,
//! exposed as a library so they can be tested.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
pub mod runner;

pub use cli::Cli;
pub use runner::{init_logging, run};
