//! Function and type descriptors for the Stimulus binding generator.
//!
//! Specification trees produced by `stimulus-parser` are merged into a
//! [`Catalog`] of [`FunctionDescriptor`]s and [`TypeDescriptor`]s. Function
//! descriptors interpret the compact attribute grammars:
//!
//! - `PARAMS`: `[PRIMARY|OPTIONAL]* [IN|OUT|INOUT]? <type> <name> [= <default>]`
//! - `DEPS`: `<param> ON <dep> ...`
//! - `PARAM_NAMES`: `<param> = <display name>`
//! - `PARAM_ORDER`: names with at most one `...`
//!
//! # Examples
//!
//! ```
//! use stimulus_model::{Catalog, ParamMode};
//! use stimulus_parser::parse_str;
//!
//! let mut catalog = Catalog::new();
//! catalog
//!     .load_functions(&parse_str("f:\n    PARAMS: IN INT a, OUT DOUBLE b\n").unwrap())
//!     .unwrap();
//!
//! let f = catalog.function("f").unwrap();
//! let outputs: Vec<_> = f
//!     .parameters()
//!     .unwrap()
//!     .values()
//!     .filter(|p| p.mode == ParamMode::Out)
//!     .map(|p| p.name.as_str())
//!     .collect();
//! assert_eq!(outputs, vec!["b"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod catalog;
mod function;
mod grammar;
mod param;
mod types;

pub use catalog::Catalog;
pub use function::{DEFAULT_RETURN_TYPE, DEPS, FunctionDescriptor, PARAM_NAMES, PARAM_ORDER, PARAMS};
pub use grammar::{
    Dependency, ORDER_ELLIPSIS, list_items, parse_dependencies, parse_param_names, parse_params,
    resolve_param_order,
};
pub use param::{ParamMode, ParamSpec};
pub use types::{Facet, NAME_TOKEN, TYPE_TOKEN, TypeDescriptor};
