//! Core types, configuration, and errors for the Stimulus binding generator.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Error hierarchy with a structural / per-function / boundary split
//! - Strong names for backends and template blocks
//! - CLI exit codes and output targets
//! - Generator configuration loaded from TOML

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod types;

pub mod cli;

pub use config::{DEFAULT_BLOCK_SIGIL, GeneratorConfig, GeneratorConfigBuilder};
pub use error::{Error, Result};
pub use types::{BackendName, BlockName};
